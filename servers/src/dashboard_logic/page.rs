//! The single HTML page. Charts are drawn client-side by plotly.js from the JSON routes.

const TEMPLATE: &str = include_str!("index.html");

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn render_index(symbol: &str) -> String {
    TEMPLATE.replace("{{SYMBOL}}", &escape_html(symbol))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_is_escaped_into_title() {
        let html = render_index("<b>AAPL</b>");
        assert!(html.contains("Interactive Financial Dashboard - &lt;b&gt;AAPL&lt;/b&gt;"));
        assert!(!html.contains("{{SYMBOL}}"));
        assert!(html.contains("/api/options"));
    }
}
