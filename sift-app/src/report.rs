//! Plain-text rendering for `sift check`.

use sift_common::Extraction;
use serde_json::Value;
use std::fmt::Write;

pub fn text_report(extraction: &Extraction) -> String {
    let value = extraction.to_value();
    let field = |v: &Value, key: &str| v.get(key).and_then(Value::as_str).unwrap_or("-").to_string();
    let steps = value.get("sift_analysis").cloned().unwrap_or(Value::Null);

    let mut out = String::new();
    let _ = writeln!(out, "Information: {}", field(&value, "content"));
    let _ = writeln!(out, "Source:      {}", field(&value, "source"));
    let _ = writeln!(out);
    for (n, (title, key)) in [
        ("Stop", "stop"),
        ("Investigate the Source", "investigate_source"),
        ("Find Better Coverage", "find_coverage"),
        ("Trace Claims", "trace_claims"),
    ]
    .into_iter()
    .enumerate()
    {
        let _ = writeln!(out, "{}. {title}\n   {}\n", n + 1, field(&steps, key));
    }
    let _ = writeln!(out, "Credibility rating: {}", field(&value, "credibility_rating"));
    let _ = writeln!(out, "Final advice:       {}", field(&value, "final_advice"));
    let _ = writeln!(out, "Learning tips:      {}", field(&value, "learning_tips"));
    if extraction.is_fallback() {
        let _ = writeln!(out, "\n(model reply was unreadable; standard cautionary verdict shown)");
    }
    out
}
