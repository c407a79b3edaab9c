//! Output functions for consistent CLI formatting

use super::context::UiContext;
use console::style;

/// Announce an action (`*** <text>` in plain mode)
pub fn header(ctx: &UiContext, text: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::step(style(text).bold()).ok();
    } else {
        println!("{} {}", style("***").cyan(), text);
    }
}

/// Indented detail line under a header
pub fn content(ctx: &UiContext, text: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::remark(text).ok();
    } else {
        for line in text.lines() {
            println!("\t{}", line);
        }
    }
}

/// Display a success step
pub fn step_ok(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::success(message).ok();
    } else {
        println!("  {} {}", style("[OK]").green(), message);
    }
}

/// Display an info step
pub fn step_info(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::info(message).ok();
    } else {
        println!("  {} {}", style("[INFO]").cyan(), message);
    }
}

/// Display an error step
pub fn step_error(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::error(message).ok();
    } else {
        println!("  {} {}", style("[FAIL]").red(), message);
    }
}

/// Display success outro
pub fn outro_success(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::outro(style(message).green().bold()).ok();
    } else {
        println!();
        println!("{} {}", style("[OK]").green(), message);
    }
}

/// Display error outro
pub fn outro_error(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::outro(style(message).red().bold()).ok();
    } else {
        println!();
        println!("{} {}", style("[ERROR]").red(), message);
    }
}
