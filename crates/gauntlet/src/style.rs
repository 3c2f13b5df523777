use std::io;
use termcolor::{Buffer, Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// The part a painted fragment plays in the report.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Role {
    PassMark,
    FailMark,
    HookMark,
    UnknownMark,
    PassBadge,
    FailBadge,
    HookBadge,
    UnknownBadge,
    Emphasis,
    Title,
    BannerPass,
    BannerFail,
}

impl Role {
    fn spec(self) -> ColorSpec {
        let mut spec = ColorSpec::new();
        match self {
            Role::PassMark => spec.set_fg(Some(Color::Green)).set_bold(true),
            Role::FailMark => spec.set_fg(Some(Color::Red)).set_bold(true),
            Role::HookMark => spec.set_fg(Some(Color::Yellow)).set_intense(true).set_bold(true),
            Role::UnknownMark => spec.set_fg(Some(Color::Blue)).set_bold(true),
            Role::PassBadge => spec.set_bg(Some(Color::Green)).set_bold(true),
            Role::FailBadge => spec.set_bg(Some(Color::Red)).set_bold(true),
            Role::HookBadge => spec.set_bg(Some(Color::Yellow)).set_intense(true).set_bold(true),
            Role::UnknownBadge => spec.set_bg(Some(Color::Blue)).set_bold(true),
            Role::Emphasis => spec.set_bold(true),
            Role::Title => spec.set_fg(Some(Color::Blue)).set_intense(true).set_bold(true),
            Role::BannerPass => spec.set_fg(Some(Color::Green)),
            Role::BannerFail => spec.set_fg(Some(Color::Red)),
        };
        spec
    }
}

/// Strategy used to colorize report fragments.
pub trait Palette {
    fn paint(&self, text: &str, role: Role) -> String;

    /// Return whether the output may move the cursor to rewrite earlier lines.
    fn rewrites_lines(&self) -> bool {
        true
    }
}

/// Colorize with ANSI escape sequences.
#[derive(Debug, Default, Copy, Clone)]
pub struct AnsiPalette;

impl Palette for AnsiPalette {
    fn paint(&self, text: &str, role: Role) -> String {
        let mut buf = Buffer::ansi();
        match write_colored(&mut buf, text, &role.spec()) {
            Ok(()) => String::from_utf8_lossy(buf.as_slice()).into_owned(),
            Err(..) => text.to_owned(),
        }
    }
}

/// Leave every fragment as is, and never move the cursor.
#[derive(Debug, Default, Copy, Clone)]
pub struct PlainPalette;

impl Palette for PlainPalette {
    fn paint(&self, text: &str, _: Role) -> String {
        text.to_owned()
    }

    fn rewrites_lines(&self) -> bool {
        false
    }
}

fn write_colored<W: ?Sized>(w: &mut W, text: &str, spec: &ColorSpec) -> io::Result<()>
where
    W: WriteColor,
{
    w.set_color(spec)?;
    w.write_all(text.as_bytes())?;
    w.reset()?;
    Ok(())
}

/// Choose the palette matching the color configuration of the standard output.
pub fn palette_for(choice: ColorChoice) -> Box<dyn Palette> {
    let colored = match choice {
        ColorChoice::Always | ColorChoice::AlwaysAnsi => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => {
            console::Term::stdout().is_term() && StandardStream::stdout(choice).supports_color()
        }
    };
    if colored {
        Box::new(AnsiPalette)
    } else {
        Box::new(PlainPalette)
    }
}
