//! HTML rendering for the single-page form

use predictor_lib::{DEFAULT_PRICE, DEFAULT_QUANTITY, PRICE_STEP};

const PAGE_TITLE: &str = "Sales Prediction App";

/// 💰 drawn as an inline SVG so the icon needs no static file route
const PAGE_ICON: &str = "data:image/svg+xml,<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 100 100'><text y='.9em' font-size='90'>💰</text></svg>";

const BANNER_URL: &str = "https://www.wavetec.com/wp-content/uploads/2024/01/streamlining-retail-transactions-through-POS-payments.jpg";

const STYLE: &str = r#"
body { font-family: sans-serif; margin: 0; display: flex; }
aside { width: 280px; padding: 1.5rem; background: #f0f2f6; min-height: 100vh; }
main { max-width: 730px; margin: 0 auto; padding: 2rem; flex: 1; }
.banner-img img { height: 250px; width: 100%; max-width: 1600px; object-fit: cover; border-radius: 10px; }
.success { background: #dff5e3; color: #11602b; padding: 0.75rem 1rem; border-radius: 6px; }
.error { background: #fde4e4; color: #8a1c1c; padding: 0.75rem 1rem; border-radius: 6px; }
label { display: block; margin-top: 1rem; }
input { padding: 0.4rem; width: 100%; box-sizing: border-box; }
button { margin-top: 1.25rem; padding: 0.5rem 1.25rem; }
"#;

const ABOUT: &str = r#"<h3>Sales Prediction App</h3>
<p>This app predicts <strong>total sales</strong> based on two key inputs:</p>
<ul><li><strong>Quantity Ordered</strong></li><li><strong>Price Each</strong></li></ul>
<hr>
<h3>How the Model Works</h3>
<p>The model was trained on historical sales data to learn patterns between
the number of items sold, the price per item and total sales revenue.</p>
<p>When you enter new values, the model estimates the likely sales amount:
<code>Predicted Sales &asymp; Quantity &times; Price &times; (Model Adjustment)</code></p>
<hr>
<h3>How to Use</h3>
<ol><li>Enter the <strong>quantity ordered</strong> and <strong>price per item</strong>.</li>
<li>Click <strong>Predict Sales</strong>.</li>
<li>View your predicted total sales instantly.</li></ol>"#;

/// Message shown under the form
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Success(String),
    Error(String),
}

/// Everything needed to render the page once
#[derive(Debug, Clone)]
pub struct PageView {
    /// Raw input values echoed back into the form
    pub quantity: String,
    pub price: String,
    pub notice: Option<Notice>,
    /// Set when the model failed to load; disables the form
    pub halted: Option<String>,
}

impl Default for PageView {
    fn default() -> Self {
        Self {
            quantity: DEFAULT_QUANTITY.to_string(),
            price: format!("{:.1}", DEFAULT_PRICE),
            notice: None,
            halted: None,
        }
    }
}

impl PageView {
    pub fn with_inputs(quantity: impl Into<String>, price: impl Into<String>) -> Self {
        Self {
            quantity: quantity.into(),
            price: price.into(),
            ..Self::default()
        }
    }

    pub fn notice(mut self, notice: Notice) -> Self {
        self.notice = Some(notice);
        self
    }

    pub fn halted(mut self, message: Option<String>) -> Self {
        self.halted = message;
        self
    }

    pub fn render(&self) -> String {
        let mut html = String::with_capacity(4096);
        let disabled = if self.halted.is_some() { " disabled" } else { "" };

        html.push_str(&format!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
             <title>{title}</title>\n<link rel=\"icon\" href=\"{icon}\">\n\
             <style>{style}</style>\n</head>\n<body>\n",
            title = PAGE_TITLE,
            icon = PAGE_ICON,
            style = STYLE
        ));

        html.push_str("<aside>\n");
        match &self.halted {
            None => html.push_str("<p class=\"success\">Model loaded successfully!</p>\n"),
            Some(_) => html.push_str("<p class=\"error\">Model unavailable</p>\n"),
        }
        html.push_str("<h2>About This App</h2>\n");
        html.push_str(ABOUT);
        html.push_str("\n</aside>\n<main>\n");

        html.push_str(&format!(
            "<div class=\"banner-img\"><img src=\"{}\" alt=\"\"></div>\n\
             <h1>{}</h1>\n<h3>Predict your sales using quantity and price</h3>\n",
            BANNER_URL, PAGE_TITLE
        ));

        if let Some(message) = &self.halted {
            html.push_str(&format!("<p class=\"error\">{}</p>\n", escape_html(message)));
        }

        html.push_str(&format!(
            "<h3>Enter Your Data</h3>\n<form method=\"post\" action=\"/predict\">\n\
             <label for=\"quantity\">Enter Quantity Ordered:</label>\n\
             <input type=\"number\" id=\"quantity\" name=\"quantity\" min=\"0\" step=\"1\" value=\"{quantity}\"{disabled}>\n\
             <label for=\"price\">Enter Price Each ($):</label>\n\
             <input type=\"number\" id=\"price\" name=\"price\" min=\"0\" step=\"{step}\" value=\"{price}\"{disabled}>\n\
             <button type=\"submit\"{disabled}>Predict Sales</button>\n</form>\n",
            quantity = escape_html(&self.quantity),
            price = escape_html(&self.price),
            step = PRICE_STEP,
            disabled = disabled
        ));

        match &self.notice {
            Some(Notice::Success(text)) => {
                html.push_str(&format!(
                    "<p class=\"success\"><strong>{}</strong></p>\n",
                    escape_html(text)
                ));
            }
            Some(Notice::Error(text)) => {
                html.push_str(&format!("<p class=\"error\">{}</p>\n", escape_html(text)));
            }
            None => {}
        }

        html.push_str("</main>\n</body>\n</html>\n");
        html
    }
}

fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
