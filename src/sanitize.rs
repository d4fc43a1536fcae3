//! Reduces a raw model reply to a bare command line.

// Checked in this order; "```" must come last since it prefixes the others.
const LEADING_FENCES: [&str; 3] = ["```bash", "```fish", "```"];

/// Strips markdown code fencing and surrounding whitespace from a raw reply.
/// Pure and idempotent; only prefix/suffix trimming, never substring removal.
pub fn clean_command(raw: &str) -> String {
    let mut command = raw.trim();

    for fence in LEADING_FENCES {
        if let Some(rest) = command.strip_prefix(fence) {
            command = rest;
            break;
        }
    }
    if let Some(rest) = command.strip_suffix("```") {
        command = rest;
    }

    command.trim().to_string()
}
