use terminal_size::{Width, terminal_size};

/// Width to use for `--help` output: the terminal width minus
/// `reserve` columns, or 80 if stdout is not a terminal.
pub fn get_terminal_width(reserve: usize) -> usize {
    if let Some((Width(width), _)) = terminal_size() {
        usize::from(width).saturating_sub(reserve).max(40)
    } else {
        80
    }
}
