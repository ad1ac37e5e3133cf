use anstyle::{AnsiColor, Color, RgbColor, Style};
use clap::builder::Styles;

use crate::utils::{CHECK, MARK};

const ACCENT: RgbColor = RgbColor(46, 94, 170); // #2E5EAA
const SUCCESS: RgbColor = RgbColor(40, 128, 96); // #288060

pub(crate) fn get_styles() -> Styles {
    Styles::styled()
        .usage(
            Style::new()
                .bold()
                .underline()
                .fg_color(Some(Color::Rgb(ACCENT))),
        )
        .header(
            Style::new()
                .bold()
                .underline()
                .fg_color(Some(Color::Rgb(ACCENT))),
        )
        .literal(Style::new().fg_color(Some(Color::Rgb(SUCCESS))))
        .invalid(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Red))),
        )
        .error(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Red))),
        )
        .valid(
            Style::new()
                .bold()
                .underline()
                .fg_color(Some(Color::Rgb(SUCCESS))),
        )
        .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::White))))
}

fn fmt_style(msg: &str, style: &Style) -> String {
    format!("{style}{msg}{style:#}")
}

pub(crate) fn fmt_red(msg: &str) -> String {
    let red = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Red)));
    fmt_style(msg, &red)
}

pub(crate) fn fmt_yellow(msg: &str) -> String {
    let yellow = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Yellow)));
    fmt_style(msg, &yellow)
}

pub(crate) fn fmt_bold(msg: &str) -> String {
    let bold = Style::new().bold();
    fmt_style(msg, &bold)
}

pub(crate) fn fmt_dimmed(msg: &str) -> String {
    let dimmed = Style::new().dimmed();
    fmt_style(msg, &dimmed)
}

pub(crate) fn fmt_success(msg: &str) -> String {
    let check = Style::new().fg_color(Some(Color::Rgb(SUCCESS)));
    format!("{} {msg}", fmt_style(CHECK, &check))
}

pub(crate) fn fmt_error(msg: &str) -> String {
    format!("{} {msg}", fmt_red(MARK))
}
