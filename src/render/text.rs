//! Plain line output.

/// One line of output per extracted line, in order.
pub fn to_text(lines: &[String]) -> String {
    let mut output = String::with_capacity(lines.iter().map(|l| l.len() + 1).sum());
    for line in lines {
        output.push_str(line);
        output.push('\n');
    }
    output
}
