use docprobe_client::HttpRenderer;
use docprobe_core::Renderer;
use docprobe_harness::{PortNegotiator, Session, SessionConfig};

use crate::common::{fixture, start_http_session};

#[tokio::test]
async fn scoped_session_serves_then_releases_port() {
    let fixture = fixture();
    let session = start_http_session(&fixture).await;
    let addr = session.base_url().socket_addrs(|| None).unwrap()[0];

    let status = session
        .scoped(async |session| {
            let url = session.base_url().join("/resources/").unwrap();
            session.renderer().render(url.as_str()).await.unwrap().status
        })
        .await;

    assert_eq!(status, 200);
    assert!(tokio::net::TcpStream::connect(addr).await.is_err());
}

#[tokio::test]
async fn scoped_session_releases_on_panic() {
    let fixture = fixture();
    let session = start_http_session(&fixture).await;
    let addr = session.base_url().socket_addrs(|| None).unwrap()[0];

    let joined = tokio::spawn(async move {
        session
            .scoped(async |_session| {
                if addr.port() != 0 {
                    panic!("scenario exploded");
                }
            })
            .await
    })
    .await;

    assert!(joined.unwrap_err().is_panic());
    assert!(tokio::net::TcpStream::connect(addr).await.is_err());
}

#[tokio::test]
async fn renders_reuse_the_negotiated_port() {
    let fixture = fixture();
    let ports = PortNegotiator::new(0);
    let session = Session::start(&fixture.session_config(), &ports, HttpRenderer::new().unwrap())
        .await
        .unwrap();

    assert_eq!(session.base_url().port(), ports.resolved());
    assert_eq!(ports.port().await.unwrap(), ports.resolved().unwrap());

    session.close().await;
}

#[tokio::test]
async fn missing_site_is_a_setup_failure() {
    let fixture = fixture();
    let config = SessionConfig {
        site_root: fixture.site().join("dist"),
        ..fixture.session_config()
    };

    let result = Session::start(&config, &PortNegotiator::new(0), HttpRenderer::new().unwrap()).await;

    let err = result.err().expect("setup should fail");
    assert!(err.is_setup_fatal(), "{err}");
}
