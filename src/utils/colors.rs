// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 danku contributors

//! Styled status lines

use colored::Colorize;

/// Print a bullet point
pub fn print_bullet(content: &str) {
    println!("  • {}", content);
}

/// Print a success check
pub fn print_success(msg: &str) {
    println!("  {} {}", "✓".green(), msg);
}

/// Print a warning to stderr so it survives piped output
pub fn print_warning(msg: &str) {
    eprintln!("  {} {}", "⚠".yellow(), msg);
}

/// Print a step that is about to run
pub fn print_info(msg: &str) {
    println!("  {} {}", "→".blue(), msg);
}

/// Turn `colored` output off when the terminal or `NO_COLOR`/`CLICOLOR` say so
pub fn configure_colors() {
    if !console::colors_enabled() {
        colored::control::set_override(false);
    }
}
