use clap::Parser;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use tumblelog::build::build_site;
use tumblelog::config::{Config, Options};

const TEMPLATE: &str = "<title>[% title %]</title>\n\
<link rel=\"stylesheet\" href=\"[% css %]\">\n\
<main>\n[% body %]</main>\n\
<nav>\n[% archive %]</nav>\n";

/// Writes `input` and the template into a temporary directory and builds the
/// site into its `htdocs` subdirectory.
fn build(input: &str, extra: &[&str]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("template.html");
    let source = dir.path().join("log.md");
    fs::write(&template, TEMPLATE).unwrap();
    fs::write(&source, input).unwrap();

    let mut args = vec![
        "tumblelog".to_owned(),
        "--template-filename".to_owned(),
        template.display().to_string(),
        "--output-dir".to_owned(),
        dir.path().join("htdocs").display().to_string(),
        "--author".to_owned(),
        "Ann".to_owned(),
        "--name".to_owned(),
        "My Log".to_owned(),
        "--description".to_owned(),
        "Things".to_owned(),
        "--blog-url".to_owned(),
        "https://example.org/".to_owned(),
        "--quiet".to_owned(),
    ];
    args.extend(extra.iter().map(|s| s.to_string()));
    args.push(source.display().to_string());

    let config = Config::from_options(Options::parse_from(args)).unwrap();
    build_site(&config).unwrap();
    dir
}

fn read(dir: &TempDir, path: &str) -> String {
    fs::read_to_string(dir.path().join("htdocs").join(path)).unwrap()
}

fn exists(dir: &TempDir, path: &str) -> bool {
    Path::new(&dir.path().join("htdocs").join(path)).is_file()
}

#[test]
fn duplicate_dates_are_written_in_order() {
    let dir = build("2024-01-02 New Year\nHello\n%\n2024-01-02 Same Day\nAgain\n", &[]);

    let day = read(&dir, "archive/2024/01/02.html");
    assert!(day.starts_with("<title>Same Day</title>\n"));
    assert!(day.contains("<p>Again</p>"));
    assert!(!day.contains("<p>Hello</p>"));

    let index = read(&dir, "index.html");
    assert!(index.contains("<p>Hello</p>"));
    assert!(index.contains("<p>Again</p>"));

    let month = read(&dir, "archive/2024/01/index.html");
    assert!(month.contains("<a href=\"02.html\">New Year</a>"));
    assert!(month.contains("<a href=\"02.html\">Same Day</a>"));
}

#[test]
fn output_layout() {
    let dir = build(
        "2024-03-31 Easter\nEggs\n%\nMore eggs\n%\n2023-12-30 Old\nOld news\n%\n\
         @about[about] 2023-01-01! About this log\nJust a log.\n",
        &[],
    );

    for path in &[
        "index.html",
        "about.html",
        "archive/2024/03/31.html",
        "archive/2023/12/30.html",
        "archive/2024/week/13.html",
        "archive/2023/week/52.html",
        "archive/2024/03/index.html",
        "archive/2023/12/index.html",
        "archive/2024/index.html",
        "archive/2023/index.html",
        "feed.rss",
        "feed.json",
    ] {
        assert!(exists(&dir, path), "missing {}", path);
    }
    assert!(!exists(&dir, "tags/index.html"));

    let day = read(&dir, "archive/2024/03/31.html");
    assert!(day.contains("<link rel=\"stylesheet\" href=\"../../../styles.css\">"));
    assert!(day.contains("<article>\n<p>Eggs</p>\n</article>\n<article>\n<p>More eggs</p>\n</article>\n"));
    assert!(day.contains("<a href=\"../../2024/week/13.html\" title=\"week 13, 2024\">13</a>"));

    let week = read(&dir, "archive/2024/week/13.html");
    assert!(week.starts_with("<title>week 13, 2024</title>\n"));
    assert!(week.contains("<li class=\"tl-self\">13</li>"));

    let about = read(&dir, "about.html");
    assert!(about.starts_with("<title>About this log</title>\n"));
    assert!(about.contains("<time class=\"tl-date\" datetime=\"2023-01-01\">01 Jan 2023</time>"));
    assert!(about.contains("<link rel=\"stylesheet\" href=\"styles.css\">"));

    let json: serde_json::Value = serde_json::from_str(&read(&dir, "feed.json")).unwrap();
    let items = json["items"].as_array().unwrap();
    assert_eq!(2, items.len());
    assert_eq!("https://example.org/archive/2024/03/31.html", items[0]["url"]);

    let rss = read(&dir, "feed.rss");
    assert!(rss.contains("https://example.org/archive/2023/12/30.html"));
}

#[test]
fn tag_mode_writes_tag_pages() {
    let dir = build(
        "2024-03-31 Easter\n---\ntags: [holiday]\n...\n## Eggs\n\nFound some.\n%\n\
         ---\ntags: [holiday, food]\n...\n## Lunch\n\nAte.\n",
        &["--tags"],
    );

    let day = read(&dir, "archive/2024/03/31.html");
    assert!(day.contains(
        "<h2 id=\"eggs\"><a href=\"https://example.org/archive/2024/03/31.html#eggs\">Eggs</a></h2>"
    ));
    assert!(day.contains("<li><a href=\"https://example.org/tags/2024/food.html\">food</a></li>"));

    let holiday = read(&dir, "tags/2024/holiday.html");
    assert!(holiday.starts_with("<title>holiday 2024</title>\n"));
    let eggs = holiday.find("<a href=\"../../archive/2024/03/31.html#eggs\">Eggs</a>").unwrap();
    let lunch = holiday.find("<a href=\"../../archive/2024/03/31.html#lunch\">Lunch</a>").unwrap();
    assert!(eggs < lunch);

    let cloud = read(&dir, "tags/index.html");
    assert_eq!(
        Some("<title>Tags</title>"),
        cloud.lines().next()
    );
    assert!(cloud.contains("<li class=\"tl-tag-size-1\"><a href=\"2024/food.html\">food</a> <span>1</span></li>"));
    assert!(cloud.contains("<li class=\"tl-tag-size-5\"><a href=\"2024/holiday.html\">holiday</a> <span>2</span></li>"));
}

#[test]
fn invalid_input_fails() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("template.html");
    let source = dir.path().join("log.md");
    fs::write(&template, TEMPLATE).unwrap();
    fs::write(&source, "no header here\n").unwrap();

    let options = Options::parse_from([
        "tumblelog",
        "-t",
        template.to_str().unwrap(),
        "-o",
        dir.path().join("htdocs").to_str().unwrap(),
        "-a",
        "Ann",
        "-n",
        "My Log",
        "--description",
        "Things",
        "-b",
        "https://example.org/",
        source.to_str().unwrap(),
    ]);
    let err = build_site(&Config::from_options(options).unwrap()).unwrap_err();
    assert_eq!("no date or page specified for first tumblelog entry", err.to_string());
    assert!(!dir.path().join("htdocs").join("index.html").exists());
}
