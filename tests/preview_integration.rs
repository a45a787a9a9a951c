use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use livemark::app::App;
use livemark::document::to_html;
use livemark::editor::{EditorBuffer, Format};
use livemark::preview::{PreviewPipeline, PreviewSurface, RenderOutcome};
use livemark::session::Session;
use livemark::theme::{Stylesheets, Theme};

#[derive(Default)]
struct Recorder {
    base: Option<PathBuf>,
    pages: Vec<String>,
}

impl PreviewSurface for Recorder {
    fn set_base_path(&mut self, base: &Path) {
        self.base = Some(base.to_path_buf());
    }

    fn set_html(&mut self, html: &str) -> std::io::Result<()> {
        self.pages.push(html.to_string());
        Ok(())
    }
}

#[test]
fn test_sample_document_renders_every_extension() {
    let html = to_html(include_str!("fixtures/sample.md")).unwrap();

    assert!(html.contains("<li class=\"task-list-item\">☑ Bump the version</li>"));
    assert!(html.contains("<li class=\"task-list-item\">☑ Update the changelog</li>"));
    assert!(html.contains("<li class=\"task-list-item\">☐ Tag the release</li>"));
    assert!(
        html.contains("<li class=\"task-list-item\">☐ Announce it on the mailing list</li>"),
        "emphasis inside a task collapses to its text"
    );
    assert!(html.contains("<li class=\"task-list-item\">☐ Nested task</li>"));
    assert!(html.contains("<table>"));
    assert!(html.contains("<dl>"));
    assert!(html.contains("<sub>2</sub>"));
    assert!(html.contains("<sup>2</sup>"));
    assert!(html.contains("<del>never</del>"));
    assert!(html.contains("class=\"language-rust\""));
    assert!(html.contains("<div class=\"note\">Raw HTML passes through.</div>"));
    assert!(html.contains("Line breaks<br />"));
    assert!(html.contains("footnote"));
}

#[test]
fn test_plain_item_keeps_its_nested_list() {
    let html = to_html("- Parent\n    - [x] Child\n").unwrap();
    assert!(html.contains("<li>Parent"));
    assert!(html.contains("<li class=\"task-list-item\">☑ Child</li>"));
}

#[test]
fn test_inline_html_in_task_keeps_its_markup() {
    let html = to_html("- [x] ship <i>soon</i> & tell\n").unwrap();
    assert!(html.contains("<li class=\"task-list-item\">☑ ship <i>soon</i> &amp; tell</li>"));
}

#[test]
fn test_editing_session_drives_debounced_preview() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("todo.md");
    fs::write(&path, "- [ ] write tests\n").unwrap();

    let mut session = Session::from_file(&path).unwrap();
    let mut pipeline = PreviewPipeline::new(Stylesheets::bundled(), Theme::Dark, 300);
    let mut surface = Recorder::default();

    pipeline.render_now(&session, &mut surface).unwrap();
    assert!(surface.pages[0].contains("☐ write tests"));
    assert_eq!(surface.base.as_deref(), Some(dir.path()));

    // Type "x" into the marker over a burst of keystrokes.
    let buffer = session.buffer_mut();
    buffer.move_to(0, 3);
    buffer.delete_forward();
    pipeline.text_changed(1_000);
    session.buffer_mut().insert_char('x');
    pipeline.text_changed(1_120);

    assert!(pipeline.poll(1_300, &session, &mut surface).unwrap().is_none());
    let outcome = pipeline.poll(1_420, &session, &mut surface).unwrap();
    assert!(matches!(outcome, Some(RenderOutcome::Rendered)));
    assert_eq!(surface.pages.len(), 2);
    assert!(surface.pages[1].contains("☑ write tests"));
    assert_eq!(session.title(), "livemark - todo.md*");

    session.save().unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "- [x] write tests\n");
}

#[test]
fn test_formatting_commands_show_up_in_preview() {
    let mut buffer = EditorBuffer::from_text("title\nbody");
    buffer.apply_format(Format::Heading(1));
    buffer.move_to(1, 0);
    buffer.select((1, 0), (1, 4));
    buffer.apply_format(Format::Bold);

    let mut pipeline = PreviewPipeline::new(Stylesheets::bundled(), Theme::Blue, 300);
    let mut surface = Recorder::default();
    pipeline.render_now(&buffer, &mut surface).unwrap();

    assert!(surface.pages[0].contains("<h1>title</h1>"));
    assert!(surface.pages[0].contains("<strong>body</strong>"));
}

#[test]
fn test_theme_change_rerenders_with_new_stylesheet() {
    let buffer = EditorBuffer::from_text("text");
    let mut pipeline = PreviewPipeline::new(Stylesheets::bundled(), Theme::Dark, 300);
    let mut surface = Recorder::default();

    pipeline.render_now(&buffer, &mut surface).unwrap();
    pipeline.cycle_theme();
    pipeline.render_now(&buffer, &mut surface).unwrap();

    assert_eq!(pipeline.theme(), &Theme::Light);
    assert_ne!(surface.pages[0], surface.pages[1]);
}

#[test]
fn test_watch_mode_republishes_after_file_change() {
    let dir = tempfile::tempdir().unwrap();
    let dir_path = dir.path().canonicalize().unwrap();
    let input = dir_path.join("live.md");
    let output = dir_path.join("live.html");
    fs::write(&input, "first version\n").unwrap();

    let app = App::new(Some(input.clone()))
        .with_output(Some(output.clone()))
        .with_watch(true)
        .with_debounce_ms(50)
        .with_render_limit(Some(2));
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let _ = tx.send(app.run().map_err(|e| e.to_string()));
    });

    let deadline = Instant::now() + Duration::from_secs(5);
    while !output.exists() && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(20));
    }
    assert!(fs::read_to_string(&output).unwrap().contains("first version"));

    // Give the backend time to register the watch
    std::thread::sleep(Duration::from_millis(500));
    fs::write(&input, "second version\n").unwrap();

    let result = rx
        .recv_timeout(Duration::from_secs(10))
        .expect("watch loop should stop after the second render");
    assert_eq!(result, Ok(()));
    assert!(fs::read_to_string(&output).unwrap().contains("second version"));
}
