use crate::compose::OutputPage;
use crate::template::{Site, Template, Values};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;
use url::Url;

/// Responsible for templating [`OutputPage`]s and writing them, and any other
/// output file, to disk.
pub struct Writer<'a> {
    /// The template for every page.
    pub template: &'a Template,

    /// Values shared by every page.
    pub site: Site<'a>,

    /// The rendered `year-range` placeholder.
    pub year_range: &'a str,

    /// The stylesheet path relative to the output root. Pages get it
    /// prefixed with one `../` per directory level.
    pub css: &'a str,

    /// The URL the output root is served from.
    pub blog_url: &'a Url,

    /// The directory in which all output files are written.
    pub output_dir: &'a Path,
}

impl Writer<'_> {
    /// Templates a single page.
    pub fn render(&self, page: &OutputPage) -> String {
        let css = format!("{}{}", "../".repeat(page.path.matches('/').count()), self.css);
        let page_url = self.page_url(&page.path);
        self.template.render(
            &self.site,
            &Values {
                title: &page.title,
                label: &page.label,
                year_range: self.year_range,
                css: &css,
                page_url: &page_url,
                body: &page.body,
                archive: &page.archive,
            },
        )
    }

    /// The public URL of the page at `path`; `index.html` is left off.
    fn page_url(&self, path: &str) -> String {
        let path = match path.strip_suffix("index.html") {
            Some(dir) if dir.is_empty() || dir.ends_with('/') => dir,
            _ => path,
        };
        crate::day::absolute_url(self.blog_url, path)
    }

    /// Templates a page and writes it to disk.
    pub fn write_page(&self, page: &OutputPage) -> Result<()> {
        self.write_file(&page.path, &self.render(page))
    }

    /// Templates and writes every page, in order. Later pages overwrite
    /// earlier ones with the same path.
    pub fn write_pages(&self, pages: &[OutputPage]) -> Result<()> {
        pages.iter().try_for_each(|page| self.write_page(page))
    }

    /// Writes `contents` to `path`, relative to the output directory,
    /// creating missing directories.
    pub fn write_file(&self, path: &str, contents: &str) -> Result<()> {
        let file_path = self.output_dir.join(path);
        if let Some(dir) = file_path.parent() {
            std::fs::create_dir_all(dir).map_err(|err| Error::CreateDir {
                path: dir.to_owned(),
                err,
            })?;
        }
        std::fs::write(&file_path, contents).map_err(|err| Error::Write {
            path: file_path.clone(),
            err,
        })?;
        info!("Created '{}'", path);
        Ok(())
    }
}

/// The result of a fallible page-writing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error writing the output files.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Creating directory '{}': {err}", .path.display())]
    CreateDir { path: PathBuf, err: std::io::Error },

    #[error("Writing file '{}': {err}", .path.display())]
    Write { path: PathBuf, err: std::io::Error },
}

#[cfg(test)]
mod test {
    use super::*;

    fn page(path: &str) -> OutputPage {
        OutputPage {
            path: path.to_owned(),
            title: String::from("T"),
            label: String::from("L"),
            body: String::from("<p>body</p>"),
            archive: String::from("<dl></dl>"),
        }
    }

    fn with_writer<T>(output_dir: &Path, f: impl FnOnce(&Writer<'_>) -> T) -> T {
        let template = Template::new("[% css %]|[% page-url %]|[% year-range %]|[% title %]|[% body %]");
        let blog_url = Url::parse("https://example.org/blog/").unwrap();
        f(&Writer {
            template: &template,
            site: Site::default(),
            year_range: "2024",
            css: "styles.css",
            blog_url: &blog_url,
            output_dir,
        })
    }

    #[test]
    fn test_render_relative_css_and_page_url() {
        let dir = Path::new("unused");
        let (root, nested, index) = with_writer(dir, |w| {
            (
                w.render(&page("index.html")),
                w.render(&page("archive/2024/01/02.html")),
                w.render(&page("archive/2024/01/index.html")),
            )
        });
        assert_eq!("styles.css|https://example.org/blog/|2024|T|<p>body</p>", root);
        assert_eq!(
            "../../../styles.css|https://example.org/blog/archive/2024/01/02.html|2024|T|<p>body</p>",
            nested
        );
        assert_eq!(
            "../../../styles.css|https://example.org/blog/archive/2024/01/|2024|T|<p>body</p>",
            index
        );
    }

    #[test]
    fn test_write_pages_creates_directories_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let mut second = page("archive/2024/01/02.html");
        second.title = String::from("Second");
        with_writer(dir.path(), |w| w.write_pages(&[page("archive/2024/01/02.html"), second])).unwrap();

        let html = std::fs::read_to_string(dir.path().join("archive/2024/01/02.html")).unwrap();
        assert!(html.contains("|Second|"));
    }
}
