//! HTML for the single LocalFix page.

use crate::advisory::render::escape_html;

/// What the region under the form shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Fresh form, nothing submitted yet
    Idle,
    /// Rendered advice fragment, already escaped and highlighted
    Advice(String),
    /// Submission refused before anything was sent
    Invalid(String),
    /// The round trip failed; the user may resubmit
    Failed(String),
}

const STYLE: &str = r#"
body {background-color: #0f172a; font-family: 'Inter', sans-serif; color: #e2e8f0; margin: 0;}
.container {max-width: 760px; margin: 0 auto; padding: 3rem 1.5rem;}
.main-title {font-size: 3rem; font-weight: 700; color: #38bdf8; text-align: center; margin-bottom: 0.3rem;}
.sub-title {font-size: 1.3rem; color: #94a3b8; text-align: center; margin-bottom: 2rem;}
form {display: flex; flex-direction: column; gap: 1rem;}
label {color: #cbd5e1; font-weight: 600;}
textarea {min-height: 120px; border-radius: 12px; padding: 12px; background: #1e293b; color: #f8fafc; border: 1px solid #334155; font-size: 16px;}
input[type=file] {color: #cbd5e1;}
button {align-self: center; background: linear-gradient(90deg, #2563eb, #1e40af); color: white; font-weight: bold; border-radius: 12px; padding: 12px 40px; font-size: 16px; border: none; cursor: pointer; transition: transform 0.2s ease, background 0.3s ease;}
button:hover {transform: scale(1.05); background: linear-gradient(90deg, #1e40af, #2563eb);}
button:disabled {opacity: 0.6; cursor: wait; transform: none;}
.response-box {background: #1e293b; padding: 20px; border-radius: 15px; box-shadow: 0 6px 20px rgba(0,0,0,0.4); margin-top: 25px; font-size: 18px; line-height: 1.6; color: #f8fafc; white-space: pre-wrap;}
.highlight {color: #facc15; font-weight: bold;}
.notice {margin-top: 25px; color: #fbbf24;}
.failure {margin-top: 25px; padding: 16px 20px; border-radius: 15px; background: #450a0a; color: #fecaca;}
"#;

// Disables the button for the whole round trip so one tab never has two requests in flight.
const SCRIPT: &str = r#"
document.getElementById('localfix-form').addEventListener('submit', function (event) {
  var button = document.getElementById('analyze');
  if (button.disabled) { event.preventDefault(); return; }
  button.disabled = true;
  button.textContent = 'Analyzing your input...';
});
"#;

/// Render the full page with the form and the given outcome below it.
///
/// `problem_text` is put back into the text area so a failed request can be resubmitted.
pub fn render_page(outcome: &Outcome, problem_text: &str) -> String {
    let region = match outcome {
        Outcome::Idle => String::new(),
        Outcome::Advice(fragment) => format!(r#"<div class="response-box">{}</div>"#, fragment),
        Outcome::Invalid(message) => {
            format!(r#"<div class="notice" role="alert">{}</div>"#, escape_html(message))
        }
        Outcome::Failed(message) => format!(
            r#"<div class="failure" role="alert"><strong>Could not get advice.</strong> {} Please try again.</div>"#,
            escape_html(message)
        ),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>LocalFix Assistant</title>
<style>{style}</style>
</head>
<body>
<div class="container">
<div class="main-title">🛠 LocalFix Assistant</div>
<div class="sub-title">Upload an image and/or describe your problem to get AI suggestions</div>
<form id="localfix-form" method="post" action="/analyze" enctype="multipart/form-data">
<label for="image">Upload an image of the problem</label>
<input id="image" name="image" type="file" accept=".jpg,.jpeg,.png,image/jpeg,image/png">
<label for="problem">Or describe your problem here:</label>
<textarea id="problem" name="problem" placeholder="E.g., My kitchen sink is leaking...">{problem}</textarea>
<button id="analyze" type="submit">🔍 Analyze &amp; Get Help</button>
</form>
{region}
</div>
<script>{script}</script>
</body>
</html>
"#,
        style = STYLE,
        problem = escape_html(problem_text),
        region = region,
        script = SCRIPT,
    )
}
