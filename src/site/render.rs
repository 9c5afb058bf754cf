use std::fmt::Write as _;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::config::SiteConfig;
use crate::error::{Error, Result};
use crate::ops::format_timestamp;
use crate::site::index::RepoIndex;
use crate::site::page::{Content, Page};
use crate::site::path::PathFile;
use crate::types::FileKind;

/// unreserved characters plus the path separator
const PATH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'/');

/// repository-wide facts shown on every page
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SiteInfo {
    pub title: String,
    pub description: Option<String>,
    pub clone_url: Option<String>,
}

impl SiteInfo {
    pub fn from_config(config: &SiteConfig, repo_path: &Path) -> Self {
        Self {
            title: config.title_for(repo_path),
            description: config.description.clone(),
            clone_url: config.clone_url.clone(),
        }
    }
}

/// turns a page into output bytes
pub trait Render {
    fn render(&self, page: &Page, site: &SiteInfo) -> Result<Vec<u8>>;
}

/// plain HTML pages sharing one stylesheet
#[derive(Clone, Debug, Default)]
pub struct HtmlRenderer {
    readme_command: Option<PathBuf>,
}

impl HtmlRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// render READMEs by piping them through an external command
    pub fn with_readme_command(mut self, command: Option<PathBuf>) -> Self {
        self.readme_command = command;
        self
    }

    fn render_readme(&self, readme: &str) -> Result<String> {
        match &self.readme_command {
            Some(command) => run_readme_command(command, readme),
            None => Ok(format!("<pre class=\"readme\">{}</pre>\n", text(readme))),
        }
    }
}

impl Render for HtmlRenderer {
    fn render(&self, page: &Page, site: &SiteInfo) -> Result<Vec<u8>> {
        let rel = relative_root(&page.file);
        let mut html = String::with_capacity(8192);

        if page.is_index() {
            render_head(&mut html, &site.title, &rel);
        } else {
            render_head(&mut html, &format!("{} - {}", page.path(), site.title), &rel);
        }
        render_header(&mut html, site, &rel);
        render_breadcrumb(&mut html, &page.file, &rel);

        html.push_str("<main>\n");
        match page.file.kind() {
            FileKind::Directory => {
                if let Some(listing) = &page.listing {
                    render_listing(&mut html, listing, &rel);
                }
            }
            FileKind::File => {
                if let Some(content) = &page.content {
                    render_content(&mut html, content);
                }
            }
            FileKind::Submodule => {
                html.push_str("<p class=\"note\">submodule, its contents are not part of this site</p>\n");
            }
        }

        render_commits(&mut html, page);

        if let Some(readme) = &page.readme {
            html.push_str("<section class=\"readme\">\n");
            html.push_str(&self.render_readme(readme)?);
            html.push_str("</section>\n");
        }

        html.push_str("</main>\n</body>\n</html>\n");
        Ok(html.into_bytes())
    }
}

impl HtmlRenderer {
    /// the landing page listing several repositories, newest first
    ///
    /// the optional readme is trusted HTML and included as is.
    pub fn render_index(&self, index: &RepoIndex) -> Vec<u8> {
        let mut html = String::with_capacity(4096);
        let site = SiteInfo {
            title: index.title.clone(),
            description: index.description.clone(),
            clone_url: None,
        };

        render_head(&mut html, &site.title, "");
        render_header(&mut html, &site, "");
        html.push_str("<main>\n");

        if let Some(readme) = &index.readme {
            html.push_str("<section class=\"readme\">\n");
            html.push_str(readme);
            html.push_str("</section>\n");
        }

        html.push_str("<table class=\"repos\">\n");
        html.push_str("<tr><th>Name</th><th>Description</th><th>Last modified</th></tr>\n");
        for repo in &index.repos {
            let _ = writeln!(
                html,
                "<tr><td><a href=\"{}/index.html\">{}</a></td><td>{}</td><td class=\"date\">{}</td></tr>",
                utf8_percent_encode(&repo.dir, PATH_ENCODE_SET),
                text(&repo.name),
                text(repo.description.as_deref().unwrap_or("")),
                format_timestamp(repo.modified)
            );
        }
        html.push_str("</table>\n");

        html.push_str("</main>\n</body>\n</html>\n");
        html.into_bytes()
    }
}

fn render_head(html: &mut String, title: &str, rel: &str) {
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    let _ = writeln!(html, "<title>{}</title>", text(title));
    let _ = writeln!(html, "<link rel=\"stylesheet\" href=\"{}style.css\">", attr(rel));
    html.push_str("</head>\n<body>\n");
}

fn render_header(html: &mut String, site: &SiteInfo, rel: &str) {
    html.push_str("<header>\n");
    let _ = writeln!(
        html,
        "<h1><a href=\"{}index.html\">{}</a></h1>",
        attr(rel),
        text(&site.title)
    );
    if let Some(description) = &site.description {
        let _ = writeln!(html, "<p>{}</p>", text(description));
    }
    if let Some(url) = &site.clone_url {
        let _ = writeln!(html, "<p>clone: <code>{}</code></p>", text(url));
    }
    html.push_str("</header>\n");
}

fn render_breadcrumb(html: &mut String, file: &PathFile, rel: &str) {
    html.push_str("<nav class=\"breadcrumb\">");
    let _ = write!(html, "<a href=\"{}index.html\">/</a>", attr(rel));

    if !file.is_root() {
        let segments: Vec<&str> = file.path().split('/').collect();
        for (i, segment) in segments.iter().enumerate() {
            if i + 1 == segments.len() {
                let _ = write!(html, "{}", text(segment));
            } else {
                let target = segments[..=i].join("/");
                let _ = write!(html, "<a href=\"{}\">{}</a>/", attr(&page_href(rel, &target)), text(segment));
            }
        }
    }
    html.push_str("</nav>\n");
}

fn render_listing(html: &mut String, listing: &[PathFile], rel: &str) {
    html.push_str("<ul class=\"listing\">\n");
    for file in listing {
        let (class, suffix) = match file.kind() {
            FileKind::Directory => ("directory", "/"),
            FileKind::Submodule => ("submodule", "@"),
            FileKind::File => ("file", ""),
        };
        let _ = writeln!(
            html,
            "<li class=\"{}\"><a href=\"{}\">{}{}</a></li>",
            class,
            attr(&page_href(rel, file.path())),
            text(file.name()),
            suffix
        );
    }
    html.push_str("</ul>\n");
}

fn render_content(html: &mut String, content: &Content) {
    if content.symlink {
        let target = String::from_utf8_lossy(&content.bytes);
        let _ = writeln!(html, "<p class=\"note\">symbolic link to <code>{}</code></p>", text(&target));
        return;
    }

    let Some(body) = content.text() else {
        let _ = writeln!(html, "<p class=\"note\">binary file, {} bytes</p>", content.len());
        return;
    };

    let lines = content_lines(body);
    html.push_str("<table class=\"content\">\n");
    for (i, line) in lines.iter().enumerate() {
        let n = i + 1;
        let _ = writeln!(
            html,
            "<tr id=\"L{n}\"><td class=\"line\"><a href=\"#L{n}\">{n}</a></td><td class=\"text\">{}</td></tr>",
            text(line)
        );
    }
    html.push_str("</table>\n");
}

fn render_commits(html: &mut String, page: &Page) {
    let log = &page.commits;
    if log.commits.is_empty() {
        return;
    }

    html.push_str("<h2>Commits</h2>\n<table class=\"commits\">\n");
    for commit in &log.commits {
        let _ = writeln!(
            html,
            "<tr><td class=\"date\">{}</td><td class=\"id\">{}</td><td>{}</td><td class=\"author\">{}</td></tr>",
            format_timestamp(commit.timestamp),
            commit.id.short(),
            text(&commit.summary),
            text(&commit.author)
        );
    }
    html.push_str("</table>\n");

    if log.total > log.commits.len() {
        let _ = writeln!(
            html,
            "<p class=\"note\">{} of {} commits</p>",
            log.commits.len(),
            log.total
        );
    }
}

/// lines of a text file; a trailing newline does not start another line
fn content_lines(body: &str) -> Vec<&str> {
    let body = body.strip_suffix('\n').unwrap_or(body);
    body.split('\n').collect()
}

/// prefix leading from a page back to the output root
fn relative_root(file: &PathFile) -> String {
    "../".repeat(file.depth().saturating_sub(1))
}

/// link to the page of `path`, relative to a page at `rel`
fn page_href(rel: &str, path: &str) -> String {
    if path.is_empty() {
        format!("{}index.html", rel)
    } else {
        format!("{}{}.html", rel, utf8_percent_encode(path, PATH_ENCODE_SET))
    }
}

/// feed a README to `command` on stdin and take HTML from its stdout
fn run_readme_command(command: &Path, readme: &str) -> Result<String> {
    let failed = |message: String| Error::ReadmeCommand {
        command: command.to_path_buf(),
        message,
    };

    let mut child = Command::new(command)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|e| failed(e.to_string()))?;

    // stdin is fed while stdout is drained
    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| failed("stdin not captured".to_string()))?;
    let input = readme.to_string();
    let writer = std::thread::spawn(move || stdin.write_all(input.as_bytes()));

    let output = child.wait_with_output().map_err(|e| failed(e.to_string()))?;
    // a broken pipe here means the child stopped reading early
    let _ = writer.join();

    if !output.status.success() {
        return Err(failed(format!("exited with {}", output.status)));
    }

    String::from_utf8(output.stdout).map_err(|_| failed("output is not utf-8".to_string()))
}
