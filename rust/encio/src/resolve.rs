//! Resolution of the effective encoding of every [`Channel`].
//!
//! Each channel picks the first non-empty candidate from, in order: its explicit
//! flag, the `--stdioe` flag (standard streams only), its environment variable,
//! `ENCIO_IOENCODING` (standard streams only), the locale codeset (argument,
//! file-system, and standard-stream channels only), and finally UTF-8.
//!
//! A label from a flag or variable that names no supported encoding is an error.
//! An unsupported locale codeset is skipped with a warning instead, since the user
//! didn't ask for it.

use std::fmt::{self, Display, Formatter};

use crate::{Channel, Codec, Error, Result};

/// The environment variable shared by the three standard streams.
pub const IO_ENCODING_ENV: &str = "ENCIO_IOENCODING";
/// The flag shared by the three standard streams.
pub const IO_ENCODING_FLAG: &str = "--stdioe";
/// Locale variables consulted for the platform default, in POSIX precedence order.
pub const LOCALE_ENV_VARS: [&str; 3] = ["LC_ALL", "LC_CTYPE", "LANG"];

/// Where a resolved encoding came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Source {
    /// A command-line flag.
    Flag(&'static str),
    /// An environment variable.
    Env(&'static str),
    /// The codeset of the locale named by the given environment variable.
    Platform(&'static str),
    /// Nothing was configured.
    Fallback,
}

impl Display for Source {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Source::Flag(flag) => write!(f, "flag {flag}"),
            Source::Env(var) => write!(f, "env {var}"),
            Source::Platform(var) => write!(f, "locale {var}"),
            Source::Fallback => f.write_str("fallback"),
        }
    }
}

/// An effective encoding together with its [`Source`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolved {
    /// The codec to use for the channel.
    pub codec: Codec,
    /// Where the codec's label came from.
    pub source: Source,
}

/// Returns the first candidate whose label isn't empty or blank.
pub fn first_label<'a, I>(candidates: I) -> Option<(&'a str, Source)>
where
    I: IntoIterator<Item = (Option<&'a str>, Source)>,
{
    candidates
        .into_iter()
        .find_map(|(label, source)| label.filter(|l| !l.trim().is_empty()).map(|l| (l, source)))
}

/// Explicit encoding labels given on the command line.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Overrides {
    /// Command-argument encoding.
    pub cae: Option<String>,
    /// File-system encoding.
    pub fse: Option<String>,
    /// Input-file encoding.
    pub ife: Option<String>,
    /// Output-file encoding.
    pub ofe: Option<String>,
    /// Subprocess command encoding.
    pub spce: Option<String>,
    /// Subprocess stdin encoding.
    pub spie: Option<String>,
    /// Subprocess stdout encoding.
    pub spoe: Option<String>,
    /// Subprocess stderr encoding.
    pub spee: Option<String>,
    /// Encoding of all three standard streams.
    pub stdioe: Option<String>,
    /// Stdin encoding.
    pub stdie: Option<String>,
    /// Stdout encoding.
    pub stdoe: Option<String>,
    /// Stderr encoding.
    pub stdee: Option<String>,
}

impl Overrides {
    /// Returns the channel's own override, ignoring `stdioe`.
    pub fn get(&self, channel: Channel) -> Option<&str> {
        match channel {
            Channel::CmdArg => &self.cae,
            Channel::FileSystem => &self.fse,
            Channel::InputFile => &self.ife,
            Channel::OutputFile => &self.ofe,
            Channel::SubprocCmd => &self.spce,
            Channel::SubprocStdin => &self.spie,
            Channel::SubprocStdout => &self.spoe,
            Channel::SubprocStderr => &self.spee,
            Channel::Stdin => &self.stdie,
            Channel::Stdout => &self.stdoe,
            Channel::Stderr => &self.stdee,
        }
        .as_deref()
    }
}

/// The locale in effect, as named by the first non-empty of [`LOCALE_ENV_VARS`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Locale {
    /// The variable the locale was read from.
    pub var: &'static str,
    /// The locale name, e.g. `ja_JP.eucJP`.
    pub name: String,
}

impl Locale {
    /// Detects the locale through `env`, which looks up an environment variable.
    pub fn detect(env: impl Fn(&str) -> Option<String>) -> Option<Self> {
        LOCALE_ENV_VARS.into_iter().find_map(|var| {
            env(var)
                .filter(|name| !name.is_empty())
                .map(|name| Self { var, name })
        })
    }

    /// Returns the codeset part of the locale name, if any.
    pub fn codeset(&self) -> Option<&str> {
        codeset_from_locale(&self.name)
    }
}

/// Extracts the codeset from a locale name of the form
/// `language[_territory][.codeset][@modifier]`. The `C` and `POSIX` locales and
/// names without a codeset have none.
pub fn codeset_from_locale(locale: &str) -> Option<&str> {
    if locale == "C" || locale == "POSIX" {
        return None;
    }
    let (_, rest) = locale.split_once('.')?;
    let codeset = rest.split_once('@').map_or(rest, |(codeset, _)| codeset);
    if codeset.is_empty() {
        None
    } else {
        Some(codeset)
    }
}

/// The effective encoding of every channel, resolved once at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodingSettings {
    channels: [Resolved; 11],
    locale: Option<Locale>,
}

impl EncodingSettings {
    /// Resolves every channel against `overrides` and the process environment.
    ///
    /// # Errors
    /// This function returns an error if a winning label doesn't name a supported
    /// encoding.
    pub fn from_env(overrides: &Overrides) -> Result<Self> {
        Self::resolve(overrides, |var| std::env::var(var).ok())
    }

    /// Resolves every channel against `overrides` and `env`, a lookup function for
    /// environment variables.
    ///
    /// # Errors
    /// This function returns an error if a winning label doesn't name a supported
    /// encoding. The next candidate is never tried in that case.
    pub fn resolve(overrides: &Overrides, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let locale = Locale::detect(&env);
        let io_env = env(IO_ENCODING_ENV);
        let mut channels = [Resolved {
            codec: Codec::utf_8(),
            source: Source::Fallback,
        }; 11];
        for channel in Channel::ALL {
            let own_env = env(channel.env_var());
            let is_terminal = channel.is_terminal();
            let platform = locale
                .as_ref()
                .filter(|_| channel.uses_platform_default())
                .and_then(|locale| locale.codeset().map(|codeset| (codeset, locale.var)));
            let candidates = [
                (overrides.get(channel), Source::Flag(channel.flag())),
                (
                    overrides.stdioe.as_deref().filter(|_| is_terminal),
                    Source::Flag(IO_ENCODING_FLAG),
                ),
                (own_env.as_deref(), Source::Env(channel.env_var())),
                (
                    io_env.as_deref().filter(|_| is_terminal),
                    Source::Env(IO_ENCODING_ENV),
                ),
                (
                    platform.map(|(codeset, _)| codeset),
                    platform.map_or(Source::Fallback, |(_, var)| Source::Platform(var)),
                ),
            ];
            match first_label(candidates) {
                Some((label, source @ Source::Platform(var))) => match Codec::for_label(label) {
                    Ok(codec) => channels[channel.index()] = Resolved { codec, source },
                    Err(_) => log::warn!(
                        "Ignoring unsupported codeset '{label}' of locale {var} for {channel}"
                    ),
                },
                Some((label, source)) => {
                    let codec = Codec::for_label(label).map_err(|_| Error::ChannelEncoding {
                        channel,
                        origin: source,
                        label: label.trim().to_owned(),
                    })?;
                    channels[channel.index()] = Resolved { codec, source };
                }
                None => {}
            }
            let resolved = channels[channel.index()];
            log::debug!(
                "Resolved {channel} encoding to {} from {}",
                resolved.codec,
                resolved.source
            );
        }
        Ok(Self { channels, locale })
    }

    /// Returns the resolved encoding and source of `channel`.
    pub fn get(&self, channel: Channel) -> Resolved {
        self.channels[channel.index()]
    }

    /// Returns the codec of `channel`.
    pub fn codec(&self, channel: Channel) -> Codec {
        self.get(channel).codec
    }

    /// Returns the locale that was consulted for platform defaults.
    pub fn locale(&self) -> Option<&Locale> {
        self.locale.as_ref()
    }

    /// Iterates over every channel and its resolved encoding.
    pub fn iter(&self) -> impl Iterator<Item = (Channel, Resolved)> + '_ {
        Channel::ALL.into_iter().map(|channel| (channel, self.get(channel)))
    }

    /// Returns an encoding worth suggesting when `channel` fails, if it differs from
    /// the one in effect. Values from the command line are suggested the stdin
    /// encoding, since a terminal typically produces both. Subprocess streams are
    /// suggested UTF-8.
    pub fn alternate(&self, channel: Channel) -> Option<Codec> {
        let alternate = match channel {
            Channel::CmdArg | Channel::SubprocCmd => self.codec(Channel::Stdin),
            Channel::SubprocStdin | Channel::SubprocStdout | Channel::SubprocStderr => {
                Codec::utf_8()
            }
            _ => return None,
        };
        (alternate != self.codec(channel)).then_some(alternate)
    }
}

impl Default for EncodingSettings {
    fn default() -> Self {
        Self {
            channels: [Resolved {
                codec: Codec::utf_8(),
                source: Source::Fallback,
            }; 11],
            locale: None,
        }
    }
}
