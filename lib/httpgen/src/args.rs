//! curl command-line parsing.
//!
//! Turns curl arguments (or a whole command string) into [`RawOptions`].
//! Only the flags that change the request are understood; output-only flags
//! are accepted and dropped. Any other flag is rejected, since its value
//! could not be told apart from the URL.

use httpgen_core::{Error, RawOptions, RawOptionsBuilder, Result};

/// Parsed curl arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurlArgs {
    /// The option model.
    pub options: RawOptions,
    /// Extra URLs that were skipped.
    pub ignored: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flag {
    Request,
    Header,
    Data,
    DataAscii,
    DataBinary,
    DataUrlencode,
    Form,
    FormString,
    Get,
    Head,
    User,
    Cookie,
    Proxy,
    Insecure,
    AwsV2,
    UploadFile,
    UserAgent,
    Referer,
    Compressed,
    TrEncoding,
    Url,
    Quiet,
    QuietWithValue,
}

impl Flag {
    fn long(name: &str) -> Option<Self> {
        let flag = match name {
            "request" => Self::Request,
            "header" => Self::Header,
            "data" => Self::Data,
            "data-ascii" => Self::DataAscii,
            "data-binary" => Self::DataBinary,
            "data-urlencode" => Self::DataUrlencode,
            "form" => Self::Form,
            "form-string" => Self::FormString,
            "get" => Self::Get,
            "head" => Self::Head,
            "user" => Self::User,
            "cookie" => Self::Cookie,
            "proxy" => Self::Proxy,
            "insecure" => Self::Insecure,
            "awsv2" => Self::AwsV2,
            "upload-file" => Self::UploadFile,
            "user-agent" => Self::UserAgent,
            "referer" => Self::Referer,
            "compressed" => Self::Compressed,
            "tr-encoding" => Self::TrEncoding,
            "url" => Self::Url,
            "silent" | "verbose" | "location" | "include" | "show-error" | "fail" => Self::Quiet,
            "output" | "max-time" | "connect-timeout" | "write-out" | "cookie-jar" => {
                Self::QuietWithValue
            }
            _ => return None,
        };
        Some(flag)
    }

    const fn short(name: char) -> Option<Self> {
        let flag = match name {
            'X' => Self::Request,
            'H' => Self::Header,
            'd' => Self::Data,
            'F' => Self::Form,
            'G' => Self::Get,
            'I' => Self::Head,
            'u' => Self::User,
            'b' => Self::Cookie,
            'x' => Self::Proxy,
            'k' => Self::Insecure,
            'T' => Self::UploadFile,
            'A' => Self::UserAgent,
            'e' => Self::Referer,
            's' | 'v' | 'L' | 'i' | 'S' | 'f' => Self::Quiet,
            'o' | 'm' | 'w' | 'c' => Self::QuietWithValue,
            _ => return None,
        };
        Some(flag)
    }

    const fn takes_value(self) -> bool {
        !matches!(
            self,
            Self::Get
                | Self::Head
                | Self::Insecure
                | Self::Compressed
                | Self::TrEncoding
                | Self::Quiet
        )
    }
}

#[derive(Debug, Default)]
struct Parser {
    builder: RawOptionsBuilder,
    url_flag: Option<String>,
    positional: Vec<String>,
    ignored: Vec<String>,
}

impl Parser {
    fn apply(&mut self, flag: Flag, value: String) {
        let builder = std::mem::take(&mut self.builder);
        self.builder = match flag {
            Flag::Request => builder.method(value),
            Flag::Header => builder.header(value),
            Flag::Data | Flag::DataAscii => builder.data(value),
            Flag::DataBinary => builder.data_binary(value),
            Flag::DataUrlencode => builder.data_urlencode(value),
            Flag::Form => builder.form(value),
            Flag::FormString => builder.form_string(value),
            Flag::Get => builder.get(true),
            Flag::Head => builder.head(true),
            Flag::User => builder.user(value),
            Flag::Cookie => builder.cookie(value),
            Flag::Proxy => builder.proxy(value),
            Flag::Insecure => builder.insecure(true),
            Flag::AwsV2 => builder.aws_v2(value),
            Flag::UploadFile => builder.upload_file(value),
            Flag::UserAgent => builder.user_agent(&value),
            Flag::Referer => builder.referer(&value),
            Flag::Compressed => builder.compressed(),
            Flag::TrEncoding => builder.tr_encoding(),
            Flag::Url => {
                self.url_flag = Some(value);
                builder
            }
            Flag::Quiet | Flag::QuietWithValue => builder,
        };
    }

    fn finish(mut self) -> Result<CurlArgs> {
        let mut urls = self.positional.into_iter();
        let url = match self.url_flag {
            Some(url) => url,
            None => urls.next().unwrap_or_default(),
        };
        for extra in urls {
            tracing::warn!(url = %extra, "extra URL ignored");
            self.ignored.push(extra);
        }
        Ok(CurlArgs {
            options: self.builder.url(url).build()?,
            ignored: self.ignored,
        })
    }
}

/// Parse curl arguments, with or without the leading `curl` word.
///
/// # Errors
///
/// Returns a configuration error for an unknown flag, a flag missing its
/// value, a missing URL, or input the option model rejects.
pub fn parse_args<I, S>(args: I) -> Result<CurlArgs>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let args: Vec<String> = args.into_iter().map(|arg| arg.as_ref().to_string()).collect();
    let mut iter = args.into_iter().peekable();
    if iter.peek().is_some_and(|first| first == "curl") {
        iter.next();
    }

    let mut parser = Parser::default();
    let mut only_urls = false;

    while let Some(arg) = iter.next() {
        if only_urls || !arg.starts_with('-') || arg == "-" {
            parser.positional.push(arg);
        } else if arg == "--" {
            only_urls = true;
        } else if let Some(long) = arg.strip_prefix("--") {
            let (name, inline) = match long.split_once('=') {
                Some((name, value)) => (name, Some(value.to_string())),
                None => (long, None),
            };
            let flag = Flag::long(name).ok_or_else(|| unknown_option(&arg))?;
            let value = if flag.takes_value() {
                match inline {
                    Some(value) => value,
                    None => next_value(&mut iter, &arg)?,
                }
            } else {
                String::new()
            };
            parser.apply(flag, value);
        } else {
            parse_short_cluster(&arg, &mut iter, &mut parser)?;
        }
    }

    parser.finish()
}

/// `-XPOST`, `-sSL`, `-kd a=1`: boolean flags may be grouped, the first flag
/// that takes a value consumes the rest of the word or the next argument.
fn parse_short_cluster<I>(arg: &str, iter: &mut I, parser: &mut Parser) -> Result<()>
where
    I: Iterator<Item = String>,
{
    let cluster = arg.trim_start_matches('-');
    for (index, name) in cluster.char_indices() {
        let flag = Flag::short(name).ok_or_else(|| unknown_option(&format!("-{name}")))?;
        if !flag.takes_value() {
            parser.apply(flag, String::new());
            continue;
        }
        let rest = cluster.get(index + name.len_utf8()..).unwrap_or_default();
        let value = if rest.is_empty() {
            next_value(iter, arg)?
        } else {
            rest.to_string()
        };
        parser.apply(flag, value);
        break;
    }
    Ok(())
}

fn unknown_option(flag: &str) -> Error {
    Error::configuration(format!("unknown curl option '{flag}'"))
}

fn next_value<I>(iter: &mut I, flag: &str) -> Result<String>
where
    I: Iterator<Item = String>,
{
    iter.next()
        .ok_or_else(|| Error::configuration(format!("option {flag} requires a value")))
}

/// Parse a whole curl command line.
///
/// # Errors
///
/// See [`tokenize`] and [`parse_args`].
pub fn parse_command(command: &str) -> Result<CurlArgs> {
    parse_args(tokenize(command)?)
}

/// Split a command line into words, honoring shell quoting.
///
/// Single quotes are literal, double quotes allow `\` escapes, and a
/// backslash-newline continues the line.
///
/// # Errors
///
/// Returns a configuration error on an unterminated quote.
pub fn tokenize(input: &str) -> Result<Vec<String>> {
    let normalized = input.replace("\\\r\n", " ").replace("\\\n", " ");

    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut in_single_quote = false;
    let mut in_double_quote = false;
    let mut escape_next = false;

    for c in normalized.chars() {
        if escape_next {
            current.push(c);
            escape_next = false;
            continue;
        }

        match c {
            '\\' if !in_single_quote => {
                escape_next = true;
                in_token = true;
            }
            '\'' if !in_double_quote => {
                in_single_quote = !in_single_quote;
                in_token = true;
            }
            '"' if !in_single_quote => {
                in_double_quote = !in_double_quote;
                in_token = true;
            }
            ' ' | '\t' | '\n' | '\r' if !in_single_quote && !in_double_quote => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            _ => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if in_single_quote || in_double_quote {
        return Err(Error::configuration("unterminated quote in command"));
    }
    if in_token {
        tokens.push(current);
    }

    Ok(tokens)
}
