use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use docprobe_client::HttpRenderer;
use docprobe_harness::{PortNegotiator, Session, SessionConfig};

/// A built site plus its markdown sources, laid out the way the real docs are.
pub struct Fixture {
    dir: TempDir,
}

impl Fixture {
    pub fn site(&self) -> PathBuf {
        self.dir.path().join("site")
    }

    pub fn docs(&self) -> PathBuf {
        self.dir.path().join("docs")
    }

    pub fn baselines(&self) -> PathBuf {
        self.dir.path().join("baselines.json")
    }

    /// Overwrite one served page.
    pub fn write_page(&self, url_path: &str, html: &str) {
        write(&self.site(), &format!("{}/index.html", url_path.trim_matches('/')), html);
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            site_root: self.site(),
            spa_fallback: false,
        }
    }
}

pub fn page(title: &str, heading: &str, tables: usize) -> String {
    format!(
        "<!doctype html><html><head><title>{title}</title></head>\
         <body><h1>{heading}</h1><main>{}</main><table></table></body></html>",
        "<table><tr><td>prop</td></tr></table>".repeat(tables)
    )
}

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

pub fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let fixture = Fixture { dir };
    let site = fixture.site();
    let docs = fixture.docs();

    write(&site, "index.html", &page("Design System", "Home", 0));
    write(&site, "index-cn/index.html", &page("设计体系 Design", "首页", 0));
    write(&site, "components/overview/index.html", &page("Overview", "Components Overview", 0));
    write(&site, "components/overview-cn/index.html", &page("概览", "组件概览", 0));
    write(&site, "resources/index.html", &page("Resources", "Resources", 0));
    write(&site, "resources-cn/index.html", &page("资源", "设计资源", 0));
    write(&site, "components/button/index.html", &page("Button", "Button", 2));
    write(&site, "components/button-cn/index.html", &page("Button", "Button 按钮", 2));
    write(&site, "components/date-picker/index.html", &page("DatePicker", "DatePicker", 3));
    write(
        &site,
        "components/date-picker-cn/index.html",
        &page("DatePicker", "DatePicker 日期选择器", 3),
    );

    for source in [
        "components/button/index.md",
        "components/button/index-cn.md",
        "components/date-picker.md",
        "components/date-picker-cn.md",
        "components/date-picker/range_demo.md",
        "components/overview/index.md",
        "components/_common/props.md",
    ] {
        write(&docs, source, "# page\n");
    }

    fixture
}

pub async fn start_http_session(fixture: &Fixture) -> Session<HttpRenderer> {
    let renderer = HttpRenderer::new().expect("Failed to create HTTP client");
    Session::start(&fixture.session_config(), &PortNegotiator::new(0), renderer)
        .await
        .expect("Failed to start session")
}
