use httpgen_core::{
    BodyFragment, BodyPlan, ContentTypeSource, HeaderEntry, HeaderOrigin, HeaderValue, Method,
    Part, QueryPlan, RawFragmentKind, ResolvedPlan, Result, Source, content_type,
};

use super::Renderer;

const FORM_DATA: &str = "multipart/form-data";

/// Renders a plan back into a normalized curl command.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurlRenderer;

impl Renderer for CurlRenderer {
    fn name(&self) -> &'static str {
        "curl"
    }

    fn render(&self, plan: &ResolvedPlan) -> Result<String> {
        let mut command = Command::default();

        method(&mut command, plan);
        url(&mut command, plan)?;
        for entry in plan.headers() {
            header(&mut command, entry);
        }
        body(&mut command, plan.body())?;

        let transport = plan.transport();
        if let Some(proxy) = &transport.proxy {
            command.arg("-x", proxy);
        }
        if transport.insecure_tls {
            command.flag("-k");
        }

        Ok(command.finish())
    }
}

#[derive(Debug)]
struct Command {
    parts: Vec<String>,
}

impl Default for Command {
    fn default() -> Self {
        Self {
            parts: vec!["curl".to_string()],
        }
    }
}

impl Command {
    fn flag(&mut self, flag: &str) {
        self.parts.push(flag.to_string());
    }

    fn arg(&mut self, flag: &str, value: &str) {
        self.parts.push(format!("{flag} {}", quote(value)));
    }

    fn finish(self) -> String {
        self.parts.join(" \\\n  ")
    }
}

fn method(command: &mut Command, plan: &ResolvedPlan) {
    let has_body = !plan.body().is_none();
    match plan.method() {
        Method::Head => command.flag("--head"),
        Method::Get if !has_body => {}
        Method::Post if has_body => {}
        other => command.arg("-X", &other.to_string()),
    }
}

fn url(command: &mut Command, plan: &ResolvedPlan) -> Result<()> {
    let effective = plan.effective_url();
    if let Some(literal) = effective.literal() {
        command.parts.push(quote(literal));
        return Ok(());
    }

    command.parts.push(quote(effective.base()));
    command.flag("-G");
    match effective.query() {
        Some(QueryPlan::Form(map)) => command.arg("-d", &map.encode()?),
        Some(QueryPlan::Fragments(fragments)) => {
            for fragment in fragments {
                data(command, fragment);
            }
        }
        None => {}
    }
    Ok(())
}

fn header(command: &mut Command, entry: &HeaderEntry) {
    match entry.origin {
        HeaderOrigin::BasicAuth => {
            for value in &entry.values {
                if let HeaderValue::BasicAuth { username, password } = value {
                    let credentials = match password {
                        Some(password) => format!("{username}:{password}"),
                        None => username.clone(),
                    };
                    command.arg("-u", &credentials);
                }
            }
        }
        HeaderOrigin::Cookie => {
            if let Some(cookies) = entry.joined() {
                command.arg("-b", &cookies);
            }
        }
        HeaderOrigin::User
        | HeaderOrigin::ContentType
        | HeaderOrigin::AwsDate
        | HeaderOrigin::AwsAuthorization => {
            for value in &entry.values {
                let text = match value {
                    // curl writes its own boundary for -F
                    HeaderValue::MultipartContentType { media_type, .. } => {
                        if content_type::essence(media_type) == FORM_DATA {
                            continue;
                        }
                        Some(media_type.clone())
                    }
                    other => other.resolve(),
                };
                if let Some(text) = text {
                    command.arg("-H", &format!("{}: {text}", entry.name));
                }
            }
        }
    }
}

fn body(command: &mut Command, body: &BodyPlan) -> Result<()> {
    match body {
        BodyPlan::None => {}
        BodyPlan::SingleLiteralOrFile(fragment) => data(command, fragment),
        BodyPlan::ConcatenatedFragments(fragments) => {
            for fragment in fragments {
                data(command, fragment);
            }
        }
        BodyPlan::SimpleFormMap(map) => command.arg("-d", &map.encode()?),
        BodyPlan::Multipart(multipart) => {
            for part in multipart.parts() {
                form(command, part);
            }
        }
    }
    Ok(())
}

fn data(command: &mut Command, fragment: &BodyFragment) {
    match &fragment.source {
        Source::File(path) => {
            let flag = match fragment.kind {
                RawFragmentKind::AsciiData => "-d",
                RawFragmentKind::UrlEncodedData => "--data-urlencode",
                RawFragmentKind::BinaryData
                | RawFragmentKind::FormField
                | RawFragmentKind::FormStringField => "--data-binary",
            };
            command.arg(flag, &format!("@{path}"));
        }
        Source::Literal(text) => {
            let encoded = fragment.encoding.apply(text);
            command.arg("--data-binary", &encoded);
        }
    }
}

fn form(command: &mut Command, part: &Part) {
    match part {
        Part::Field { name, value } => command.arg("--form-string", &format!("{name}={value}")),
        Part::InlineFile {
            name,
            path,
            content_type,
        } => {
            let mut value = format!("{name}=<{path}");
            if let Some(content_type) = content_type {
                value.push_str(";type=");
                value.push_str(content_type);
            }
            command.arg("-F", &value);
        }
        Part::File {
            name,
            path,
            filename,
            content_type,
        } => {
            let mut value = format!("{name}=@{path}");
            if filename != httpgen_core::basename(path) {
                value.push_str(";filename=");
                value.push_str(filename);
            }
            if let ContentTypeSource::Explicit(content_type) = content_type {
                value.push_str(";type=");
                value.push_str(content_type);
            }
            command.arg("-F", &value);
        }
    }
}

/// Single-quote a word unless it only holds shell-safe characters.
fn quote(word: &str) -> String {
    let safe = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:@=,+%".contains(c));
    if safe {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', "'\\''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_only_when_needed() {
        assert_eq!(quote("http://x/a"), "http://x/a");
        assert_eq!(quote("http://x/?a=1&b=2"), "'http://x/?a=1&b=2'");
        assert_eq!(quote("it's"), "'it'\\''s'");
        assert_eq!(quote(""), "''");
    }

    #[test]
    fn form_file_keeps_explicit_parameters() {
        let mut command = Command::default();
        form(
            &mut command,
            &Part::File {
                name: "f".to_string(),
                path: "/tmp/a.txt".to_string(),
                filename: "b.txt".to_string(),
                content_type: ContentTypeSource::Explicit("text/csv".to_string()),
            },
        );
        assert_eq!(
            command.finish(),
            "curl \\\n  -F 'f=@/tmp/a.txt;filename=b.txt;type=text/csv'"
        );
    }

    #[test]
    fn multipart_content_type_keeps_other_media_types() {
        let entry = |media_type: &str| HeaderEntry {
            name: "Content-Type".to_string(),
            values: vec![HeaderValue::MultipartContentType {
                media_type: media_type.to_string(),
                boundary: "b".to_string(),
            }],
            origin: HeaderOrigin::ContentType,
        };

        let mut command = Command::default();
        header(&mut command, &entry("multipart/form-data"));
        assert_eq!(command.finish(), "curl");

        let mut command = Command::default();
        header(&mut command, &entry("multipart/mixed"));
        assert_eq!(
            command.finish(),
            "curl \\\n  -H 'Content-Type: multipart/mixed'"
        );
    }

    #[test]
    fn form_file_omits_default_filename() {
        let mut command = Command::default();
        form(&mut command, &Part::file("f", "/tmp/a.txt"));
        assert_eq!(command.finish(), "curl \\\n  -F f=@/tmp/a.txt");
    }
}
