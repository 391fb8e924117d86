//! Web-platform polyfills injected into every rendered document.
//!
//! Each stand-in is installed only when the environment lacks the native
//! API, so on a full browser the prelude is inert.

const BLOB: &str = r#"
  if (typeof g.Blob === 'undefined') {
    g.Blob = class Blob {
      constructor(parts, options) {
        this._text = (parts || []).map(function (p) { return String(p); }).join('');
        this.type = String((options && options.type) || '').toLowerCase();
        this.size = this._text.length;
      }
      text() { return Promise.resolve(this._text); }
      slice(start, end, type) { return new Blob([this._text.slice(start, end)], { type: type }); }
    };
  }
"#;

const URL_SEARCH_PARAMS: &str = r#"
  if (typeof g.URLSearchParams === 'undefined') {
    var decode = function (s) { return decodeURIComponent(s.replace(/\+/g, ' ')); };
    g.URLSearchParams = class URLSearchParams {
      constructor(init) {
        this._pairs = [];
        if (typeof init === 'string') {
          init.replace(/^\?/, '').split('&').filter(Boolean).forEach(function (part) {
            var i = part.indexOf('=');
            var k = i < 0 ? part : part.slice(0, i);
            var v = i < 0 ? '' : part.slice(i + 1);
            this._pairs.push([decode(k), decode(v)]);
          }, this);
        } else if (init) {
          Object.keys(init).forEach(function (k) { this._pairs.push([k, String(init[k])]); }, this);
        }
      }
      append(k, v) { this._pairs.push([String(k), String(v)]); }
      delete(k) { this._pairs = this._pairs.filter(function (p) { return p[0] !== k; }); }
      get(k) { var p = this._pairs.find(function (p) { return p[0] === k; }); return p ? p[1] : null; }
      getAll(k) { return this._pairs.filter(function (p) { return p[0] === k; }).map(function (p) { return p[1]; }); }
      has(k) { return this._pairs.some(function (p) { return p[0] === k; }); }
      set(k, v) { this.delete(k); this.append(k, v); }
      forEach(cb, thisArg) { this._pairs.forEach(function (p) { cb.call(thisArg, p[1], p[0], this); }, this); }
      toString() {
        return this._pairs.map(function (p) {
          return encodeURIComponent(p[0]) + '=' + encodeURIComponent(p[1]);
        }).join('&');
      }
    };
  }
"#;

const TEXT_CODEC: &str = r#"
  if (typeof g.TextEncoder === 'undefined') {
    g.TextEncoder = class TextEncoder {
      get encoding() { return 'utf-8'; }
      encode(input) {
        var bin = unescape(encodeURIComponent(String(input === undefined ? '' : input)));
        var out = new Uint8Array(bin.length);
        for (var i = 0; i < bin.length; i++) out[i] = bin.charCodeAt(i);
        return out;
      }
    };
  }
  if (typeof g.TextDecoder === 'undefined') {
    g.TextDecoder = class TextDecoder {
      get encoding() { return 'utf-8'; }
      decode(bytes) {
        if (!bytes) return '';
        var view = bytes instanceof Uint8Array ? bytes : new Uint8Array(bytes.buffer || bytes);
        var bin = '';
        for (var i = 0; i < view.length; i++) bin += String.fromCharCode(view[i]);
        return decodeURIComponent(escape(bin));
      }
    };
  }
"#;

/// Selection of polyfills to install.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolyfillSet {
    pub blob: bool,
    pub url_search_params: bool,
    /// `TextEncoder` and `TextDecoder`.
    pub text_codec: bool,
}

impl Default for PolyfillSet {
    fn default() -> Self {
        Self {
            blob: true,
            url_search_params: true,
            text_codec: true,
        }
    }
}

impl PolyfillSet {
    pub fn none() -> Self {
        Self {
            blob: false,
            url_search_params: false,
            text_codec: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.blob || self.url_search_params || self.text_codec)
    }

    /// JavaScript prelude installing the selected polyfills, or an empty
    /// string when none are selected.
    pub fn script(&self) -> String {
        if self.is_empty() {
            return String::new();
        }

        let mut body = String::new();
        if self.blob {
            body.push_str(BLOB);
        }
        if self.url_search_params {
            body.push_str(URL_SEARCH_PARAMS);
        }
        if self.text_codec {
            body.push_str(TEXT_CODEC);
        }

        format!("(function (g) {{{body}}})(typeof globalThis !== 'undefined' ? globalThis : window);\n")
    }
}
