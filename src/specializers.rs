//! The specializers that come with this crate.

use std::collections::HashSet;

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use tagtree::{att, opt_att, Document, NodeId};
use uuid::Uuid;

use chj_util::warn;

use crate::specializer::{Prefix, Specializer};

/// Separates the main part of the data from its options (`img`
/// dimensions, `select` script URL).
const OPTIONS_SEPARATOR: &str = "$$";

fn fresh_id() -> String {
    Uuid::new_v4().to_string()
}

fn parse_dimension(s: &str, what: &str, dimensions: &str) -> Result<Option<String>> {
    if s.is_empty() {
        Ok(None)
    } else if s.chars().all(|c| c.is_ascii_digit()) {
        Ok(Some(s.to_string()))
    } else {
        bail!("invalid {what} {s:?} in image dimensions {dimensions:?}")
    }
}


/// `@img:URL`, `@img:URL$$WxH`, `@img:URL$$W`, `@img:URL$$xH`
pub struct ImgSpecializer {
    prefix: Prefix,
}

impl ImgSpecializer {
    pub fn new() -> Self {
        ImgSpecializer { prefix: Prefix::new("img") }
    }

    /// Width and height from e.g. `100x50`, `100` or `x50`.
    pub fn parse_dimensions(dimensions: &str) -> Result<(Option<String>, Option<String>)> {
        let (w, h) = match dimensions.split_once('x') {
            Some((w, h)) => (w, h),
            None => (dimensions, "")
        };
        let w = parse_dimension(w, "width", dimensions)?;
        let h = parse_dimension(h, "height", dimensions)?;
        if w.is_none() && h.is_none() {
            bail!("image dimensions {dimensions:?} give neither width nor height")
        }
        Ok((w, h))
    }
}

impl Specializer for ImgSpecializer {
    fn prefix(&self) -> &Prefix {
        &self.prefix
    }

    fn raw_parse(&mut self, doc: &Document, data: &str) -> Result<NodeId> {
        let (url, (w, h)) = match data.split_once(OPTIONS_SEPARATOR) {
            Some((url, dimensions)) => (url, Self::parse_dimensions(dimensions)?),
            None => (data, (None, None))
        };
        Ok(doc.img([att("src", url),
                    opt_att("width", w),
                    opt_att("height", h)])?)
    }
}


/// `@color:CSS-COLOR`: a colored square, optionally with a tooltip
/// showing the color value on hover.
pub struct ColorSpecializer {
    prefix: Prefix,
    pub tooltips: bool,
}

impl ColorSpecializer {
    pub fn new() -> Self {
        ColorSpecializer { prefix: Prefix::new("color"), tooltips: true }
    }

    pub fn without_tooltips() -> Self {
        ColorSpecializer { tooltips: false, ..Self::new() }
    }
}

impl Specializer for ColorSpecializer {
    fn prefix(&self) -> &Prefix {
        &self.prefix
    }

    fn raw_parse(&mut self, doc: &Document, data: &str) -> Result<NodeId> {
        let id = fresh_id();
        let block = doc.div(
            [att("id", &id),
             att("class", "tbldis-gen-color-component"),
             att("style", format!("background-color: {data}; width: 45px; height: 45px"))],
            [doc.staticstr("&nbsp;")])?;
        if !self.tooltips {
            return Ok(doc.group([block])?)
        }
        let tooltip = doc.div(
            [att("hidden", "true"),
             att("id", format!("sub-{id}")),
             att("class", "tbldis-gen-tooltop")],
            [doc.escaped_text(data)])?;
        let script = doc.script([], [doc.text(format!(
            "\n\
             p = document.getElementById('{id}');\n\
             p.onmouseenter = (event) => {{\n\
             \x20   let q = document.getElementById('sub-{id}')\n\
             \x20   q.removeAttribute('hidden')\n\
             \x20   q.style.left = `${{event.x + 10}}px`\n\
             \x20   q.style.top = `${{event.y - 20}}px`\n\
             }}\n\
             p.onmouseleave = () => {{\n\
             \x20   let q = document.getElementById('sub-{id}')\n\
             \x20   q.setAttribute('hidden', true)\n\
             }}\n"))])?;
        Ok(doc.group([tooltip, block, script])?)
    }
}


/// `@pydate`: the date of rendering, e.g. "Sunday, October 18,
/// 2026"; `@pydate:M-D-Y` renders the given date instead. Any
/// other text after the keyword is ignored.
pub struct PyDateSpecializer {
    prefix: Prefix,
    today: Option<NaiveDate>,
}

impl PyDateSpecializer {
    pub fn new() -> Self {
        PyDateSpecializer { prefix: Prefix::with_delimiter("pydate", ""), today: None }
    }

    /// Use `today` instead of the system date.
    pub fn with_today(today: NaiveDate) -> Self {
        PyDateSpecializer { today: Some(today), ..Self::new() }
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    /// Parse `M-D-Y`.
    pub fn parse_date(s: &str) -> Result<NaiveDate> {
        let parts: Vec<&str> = s.split('-').collect();
        if let [m, d, y] = parts[..] {
            let num = |part: &str, what: &str| -> Result<u32> {
                part.trim().parse::<u32>().with_context(
                    || anyhow!("invalid {what} {part:?} in date {s:?}"))
            };
            let (m, d, y) = (num(m, "month")?, num(d, "day")?, num(y, "year")?);
            NaiveDate::from_ymd_opt(y as i32, m, d).ok_or_else(
                || anyhow!("no such date: {s:?}"))
        } else {
            bail!("expecting a date in M-D-Y format, got {s:?}")
        }
    }
}

impl Specializer for PyDateSpecializer {
    fn prefix(&self) -> &Prefix {
        &self.prefix
    }

    fn raw_parse(&mut self, doc: &Document, data: &str) -> Result<NodeId> {
        // Only `:` followed by a date counts, other text is ignored.
        let date = match data.strip_prefix(':') {
            Some(s) if !s.trim().is_empty() => Self::parse_date(s)?,
            _ => self.today()
        };
        Ok(doc.text(date.format("%A, %B %d, %Y").to_string()))
    }
}


/// `@jsdate`: the date shown by the browser, in its locale.
pub struct JsDateSpecializer {
    prefix: Prefix,
}

impl JsDateSpecializer {
    pub fn new() -> Self {
        JsDateSpecializer { prefix: Prefix::with_delimiter("jsdate", "") }
    }
}

impl Specializer for JsDateSpecializer {
    fn prefix(&self) -> &Prefix {
        &self.prefix
    }

    // Whatever follows the keyword is ignored.
    fn raw_parse(&mut self, doc: &Document, _data: &str) -> Result<NodeId> {
        let id = fresh_id();
        let placeholder = doc.span([att("class", "tbldis-gen"), att("id", &id)], [])?;
        let script = doc.script([], [doc.text(format!(
            "\n\
             element = document.getElementById('{id}');\n\
             element.textContent = new Date().toLocaleDateString();\n"))])?;
        Ok(doc.group([placeholder, script])?)
    }
}


/// `@rand`: a random number between 0 and 1, generated by the
/// browser.
pub struct RandomNumberSpecializer {
    prefix: Prefix,
}

impl RandomNumberSpecializer {
    pub fn new() -> Self {
        RandomNumberSpecializer { prefix: Prefix::with_delimiter("rand", "") }
    }
}

impl Specializer for RandomNumberSpecializer {
    fn prefix(&self) -> &Prefix {
        &self.prefix
    }

    fn raw_parse(&mut self, doc: &Document, _data: &str) -> Result<NodeId> {
        let id = fresh_id();
        let placeholder = doc.div([att("class", "tbldis-gen"), att("id", &id)], [])?;
        let script = doc.script([], [doc.text(format!(
            "\n\
             element = document.getElementById('{id}');\n\
             element.textContent = Math.random().toFixed(4);\n"))])?;
        Ok(doc.group([placeholder, script])?)
    }
}


/// `@html:MARKUP`, inserted as is. Only for trusted input!
pub struct HtmlSpecializer {
    prefix: Prefix,
}

impl HtmlSpecializer {
    pub fn new() -> Self {
        HtmlSpecializer { prefix: Prefix::new("html") }
    }
}

impl Specializer for HtmlSpecializer {
    fn prefix(&self) -> &Prefix {
        &self.prefix
    }

    fn raw_parse(&mut self, doc: &Document, data: &str) -> Result<NodeId> {
        Ok(doc.text(data))
    }
}


/// `@select:a;b=Bravo;...$$URL`: a dropdown with the options `a`
/// (labelled "a") and `b` (labelled "Bravo"). The optional script
/// URL is loaded once per render pass, after the first select that
/// asked for it.
pub struct SelectSpecializer {
    prefix: Prefix,
    /// Script URLs, in the order first seen.
    sources: Vec<String>,
    /// Those of `sources` that have been output already.
    emitted: HashSet<String>,
}

impl SelectSpecializer {
    pub fn new() -> Self {
        SelectSpecializer {
            prefix: Prefix::new("select"),
            sources: Vec::new(),
            emitted: HashSet::new(),
        }
    }

    /// `(value, label)` pairs. Empty entries are skipped.
    pub fn parse_options(s: &str) -> Vec<(&str, &str)> {
        let mut options = Vec::new();
        for entry in s.split(';') {
            if entry.is_empty() {
                warn!("skipping empty entry in select options {s:?}");
                continue;
            }
            options.push(entry.split_once('=').unwrap_or((entry, entry)));
        }
        options
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }
}

impl Specializer for SelectSpecializer {
    fn prefix(&self) -> &Prefix {
        &self.prefix
    }

    fn raw_parse(&mut self, doc: &Document, data: &str) -> Result<NodeId> {
        let (options, source) = match data.split_once(OPTIONS_SEPARATOR) {
            Some((options, source)) => (options, Some(source.trim())),
            None => (data, None)
        };
        if let Some(source) = source {
            if source.is_empty() {
                bail!("empty script URL in select {data:?}")
            }
            if !self.sources.iter().any(|s| s == source) {
                self.sources.push(source.to_string());
            }
        }
        let options = Self::parse_options(options);
        if options.is_empty() {
            bail!("select without options: {data:?}")
        }

        let id = fresh_id();
        let mut option_elements = Vec::with_capacity(options.len());
        for (value, label) in options {
            option_elements.push(
                doc.option([att("value", value)], [doc.escaped_text(label)])?);
        }
        let select = doc.element("select", [att("id", &id)], option_elements)?;
        let container = doc.div([att("class", "tbldis-gen-select")], [select])?;

        let mut body = vec![container];
        for source in &self.sources {
            if self.emitted.insert(source.clone()) {
                body.push(doc.script([att("src", source)], [])?);
            }
        }
        body.push(doc.script([], [doc.text(format!(
            "\n\
             element = document.getElementById('{id}');\n\
             element.onchange = () => {{\n\
             \x20   element.dispatchEvent(new CustomEvent('tbldis-gen-select', \
             {{ bubbles: true, detail: element.value }}));\n\
             }}\n"))])?);
        Ok(doc.group(body)?)
    }

    fn reset(&mut self) {
        self.sources.clear();
        self.emitted.clear();
    }
}


/// `@base64:DATA`: the decoded data, inserted as is (like `@html:`).
pub struct Base64Specializer {
    prefix: Prefix,
}

impl Base64Specializer {
    pub fn new() -> Self {
        Base64Specializer { prefix: Prefix::new("base64") }
    }
}

impl Specializer for Base64Specializer {
    fn prefix(&self) -> &Prefix {
        &self.prefix
    }

    fn raw_parse(&mut self, doc: &Document, data: &str) -> Result<NodeId> {
        let bytes = base64::decode(data.trim()).with_context(
            || anyhow!("decoding base64 data {data:?}"))?;
        let s = String::from_utf8(bytes).with_context(
            || anyhow!("base64 data {data:?} is not UTF-8"))?;
        Ok(doc.text(s))
    }
}


#[cfg(test)]
mod tests {
    use tagrules::BUILTIN_RULES;
    use tagtree::NodeKind;

    use super::*;

    fn doc() -> Document<'static> {
        Document::new(&*BUILTIN_RULES)
    }

    #[test]
    fn t_img() {
        let h = doc();
        let mut s = ImgSpecializer::new();
        let n = s.parse(&h, "@img:http://x/y.png$$100x50").unwrap();
        assert_eq!(h.to_html_string(n),
                   r#"<img src="http://x/y.png" width="100" height="50" />"#);
        let n = s.parse(&h, "@img:a.png$$100").unwrap();
        assert_eq!(h.to_html_string(n), r#"<img src="a.png" width="100" />"#);
        let n = s.parse(&h, "@img:a.png$$x7").unwrap();
        assert_eq!(h.to_html_string(n), r#"<img src="a.png" height="7" />"#);
        let n = s.parse(&h, "@img:a.png").unwrap();
        assert_eq!(h.to_html_string(n), r#"<img src="a.png" />"#);
        let n = s.parse(&h, "@img:a.png?x=\"1\"").unwrap();
        assert_eq!(h.to_html_string(n), r#"<img src="a.png?x=&quot;1&quot;" />"#);
    }

    #[test]
    fn t_img_malformed() {
        let h = doc();
        let mut s = ImgSpecializer::new();
        for bad in ["@img:a.png$$", "@img:a.png$$x", "@img:a.png$$1x2x3",
                    "@img:a.png$$ax5", "@img:a.png$$10px", "@img:a.png$$1$$2"] {
            assert!(s.parse(&h, bad).is_err(), "{bad:?}");
        }
    }

    #[test]
    fn t_color() {
        let h = doc();
        let mut s = ColorSpecializer::new();
        let g = s.parse(&h, "@color:#ff0000").unwrap();
        assert_eq!(h.kind(g), NodeKind::Group);
        let parts = h.children(g);
        assert_eq!(parts.len(), 3);
        let (tooltip, block, script) = (parts[0], parts[1], parts[2]);
        let id = h.get_attribute(block, "id").unwrap();
        assert_eq!(id.len(), 36);
        assert_eq!(h.get_attribute(tooltip, "id").unwrap().as_str(), format!("sub-{id}"));
        assert_eq!(h.get_attribute(tooltip, "hidden").as_deref(), Some("true"));
        assert_eq!(h.get_attribute(block, "style").as_deref(),
                   Some("background-color: #ff0000; width: 45px; height: 45px"));
        assert_eq!(h.to_html_string(tooltip),
                   format!(r#"<div hidden="true" id="sub-{id}" class="tbldis-gen-tooltop">#ff0000</div>"#));
        let js = h.to_html_string(script);
        assert!(js.contains(&format!("document.getElementById('{id}')")));
        assert!(js.contains("q.style.left = `${event.x + 10}px`"));

        let g2 = s.parse(&h, "@color:red").unwrap();
        let id2 = h.get_attribute(h.children(g2)[1], "id").unwrap();
        assert_ne!(id, id2);
    }

    #[test]
    fn t_color_without_tooltips() {
        let h = doc();
        let mut s = ColorSpecializer::without_tooltips();
        let g = s.parse(&h, "@color:blue").unwrap();
        let parts = h.children(g);
        assert_eq!(parts.len(), 1);
        assert_eq!(h.get_attribute(parts[0], "class").as_deref(),
                   Some("tbldis-gen-color-component"));
        assert!(h.to_html_string(g).ends_with(">&nbsp;</div>"));
    }

    #[test]
    fn t_pydate() {
        let h = doc();
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let mut s = PyDateSpecializer::with_today(today);
        let n = s.parse(&h, "@pydate").unwrap();
        assert_eq!(h.to_html_string(n), "Sunday, October 18, 2026");
        let n = s.parse(&h, "@pydate:7-4-1776").unwrap();
        assert_eq!(h.to_html_string(n), "Thursday, July 04, 1776");
        for ignored in ["@pydate:", "@pydate: ", "@pydatex", "@pydate (render date)"] {
            let n = s.parse(&h, ignored).unwrap();
            assert_eq!(h.to_html_string(n), "Sunday, October 18, 2026", "{ignored:?}");
        }
        for bad in ["@pydate:13-1-2000", "@pydate:2-30-2000", "@pydate:1-2",
                    "@pydate:a-b-c"] {
            assert!(s.parse(&h, bad).is_err(), "{bad:?}");
        }
        // system date
        let mut s = PyDateSpecializer::new();
        let n = s.parse(&h, "@pydate").unwrap();
        assert!(h.to_html_string(n).contains(", "));
    }

    #[test]
    fn t_jsdate_and_rand() {
        let h = doc();
        let mut js = JsDateSpecializer::new();
        let g = js.parse(&h, "@jsdate whatever").unwrap();
        let parts = h.children(g);
        assert_eq!(h.name(parts[0]).as_str(), "span");
        let id = h.get_attribute(parts[0], "id").unwrap();
        assert!(h.to_html_string(parts[1]).contains(&format!("getElementById('{id}')")));
        assert!(h.to_html_string(g).contains("toLocaleDateString()"));

        let mut r = RandomNumberSpecializer::new();
        let g = r.parse(&h, "@rand").unwrap();
        let parts = h.children(g);
        assert_eq!(h.name(parts[0]).as_str(), "div");
        assert!(h.to_html_string(parts[1]).contains("Math.random().toFixed(4)"));
    }

    #[test]
    fn t_html_and_base64() {
        let h = doc();
        let mut s = HtmlSpecializer::new();
        let n = s.parse(&h, "@html:<b>bold</b>").unwrap();
        assert_eq!(h.to_html_string(n), "<b>bold</b>");

        let mut s = Base64Specializer::new();
        let n = s.parse(&h, "@base64:PGk+aGk8L2k+").unwrap();
        assert_eq!(h.to_html_string(n), "<i>hi</i>");
        assert!(s.parse(&h, "@base64:!!!").is_err());
        // "\xff\xfe" is not UTF-8
        assert!(s.parse(&h, "@base64://4=").is_err());
    }

    #[test]
    fn t_select() {
        let h = doc();
        let mut s = SelectSpecializer::new();
        let g = s.parse(&h, "@select:a;b=Bravo").unwrap();
        let container = h.children(g)[0];
        assert_eq!(h.name(container).as_str(), "div");
        let select = h.select(container, "select").unwrap().unwrap();
        let options = h.children(select);
        assert_eq!(options.len(), 2);
        assert_eq!(h.get_attribute(options[0], "value").as_deref(), Some("a"));
        assert_eq!(h.to_html_string(h.children(options[0])[0]), "a");
        assert_eq!(h.get_attribute(options[1], "value").as_deref(), Some("b"));
        assert_eq!(h.to_html_string(h.children(options[1])[0]), "Bravo");
        assert_eq!(h.to_html_string(options[1]), r#"<option value="b">Bravo</option>"#);
        // container and wiring script only
        assert_eq!(h.children(g).len(), 2);
        assert!(s.sources().is_empty());
    }

    #[test]
    fn t_select_sources_once_per_pass() {
        let h = doc();
        let mut s = SelectSpecializer::new();
        let script_srcs = |g: NodeId| -> Vec<String> {
            h.select_all(g, "script").unwrap().into_iter()
                .filter_map(|n| h.get_attribute(n, "src"))
                .map(|v| v.to_string())
                .collect()
        };
        let g1 = s.parse(&h, "@select:x;y$$/s1.js").unwrap();
        assert_eq!(script_srcs(g1), ["/s1.js"]);
        let g2 = s.parse(&h, "@select:x$$/s1.js").unwrap();
        assert!(script_srcs(g2).is_empty());
        let g3 = s.parse(&h, "@select:x$$/s2.js").unwrap();
        assert_eq!(script_srcs(g3), ["/s2.js"]);
        assert_eq!(s.sources(), ["/s1.js", "/s2.js"]);
        s.reset();
        assert!(s.sources().is_empty());
        let g4 = s.parse(&h, "@select:x$$/s1.js").unwrap();
        assert_eq!(script_srcs(g4), ["/s1.js"]);
    }

    #[test]
    fn t_select_malformed() {
        let h = doc();
        let mut s = SelectSpecializer::new();
        assert!(s.parse(&h, "@select:").is_err());
        assert!(s.parse(&h, "@select:;;").is_err());
        assert!(s.parse(&h, "@select:a$$").is_err());
        assert_eq!(SelectSpecializer::parse_options("a;;b=c"), [("a", "a"), ("b", "c")]);
        let g = s.parse(&h, "@select:<x>=<y>").unwrap();
        assert!(h.to_html_string(g).contains(r#"<option value="&lt;x&gt;">&lt;y&gt;</option>"#));
    }
}
