use super::*;
use crate::finalize::finalize;
use crate::options::{DefinitionStyle, ImageDialect, PreviewMode};
use en_html::parse;

struct Output {
    text: String,
    diagnostics: Diagnostics,
    internal_links: Vec<String>,
    resources: Vec<String>,
}

fn run_with(html: &str, options: &ConvertOptions) -> Output {
    let doc = parse(html);
    let body = doc.body().unwrap();
    let mut walker = Walker::new(options);
    let raw = walker.body(body);
    Output {
        text: finalize(&raw, options.hard_break, None).unwrap(),
        diagnostics: walker.diagnostics,
        internal_links: walker.internal_links,
        resources: walker.resources,
    }
}

fn md(html: &str) -> String {
    run_with(html, &ConvertOptions::default()).text
}

// Inline formatting

#[test]
fn test_bold_and_italic_siblings() {
    assert_eq!(md("<b>hi</b> <i>there</i>"), "**hi** *there*\n");
}

#[test]
fn test_inline_tags() {
    assert_eq!(md("<u>u</u>"), "<u>u</u>\n");
    assert_eq!(md("<s>gone</s> <del>x</del>"), "~~gone~~ ~~x~~\n");
    assert_eq!(md("<strong>a</strong><em>b</em>"), "**a***b*\n");
    assert_eq!(md("x<sup>2</sup> H<sub>2</sub>O"), "x<sup>2</sup> H<sub>2</sub>O\n");
    assert_eq!(md("<small>fine</small>"), "<sub><sup>fine</sup></sub>\n");
    assert_eq!(md("<code>a_b</code>"), "`a_b`\n");
    assert_eq!(md("<q>said</q>"), "\"said\"\n");
    assert_eq!(md("<abbr title=\"HyperText\">HTML</abbr>"), "<abbr title=\"HyperText\">HTML</abbr>\n");
    assert_eq!(md("<mark>hot</mark>"), "==hot==\n");
}

#[test]
fn test_text_is_escaped() {
    assert_eq!(md("<div>a_b * c</div>"), "a\\_b \\* c\n");
}

#[test]
fn test_source_newlines_become_spaces() {
    assert_eq!(md("<div>one\ntwo</div>"), "one two\n");
}

#[test]
fn test_span_styles() {
    let html = r#"<div><span style="font-weight: bold;">bold</span> and <span style="color: rgb(255, 0, 0);">red</span></div>"#;
    assert_eq!(md(html), "**bold** and <span style=\"color: rgb(255, 0, 0)\">red</span>\n");
}

#[test]
fn test_adjacent_spans_share_formatting() {
    let html = r#"<div><span style="font-weight: bold;">a </span><span style="font-weight: bold; font-style: italic;">b</span></div>"#;
    assert_eq!(md(html), "__a *b*__\n");

    let html = r#"<div><span style="font-weight: bold;">a </span><span style="font-weight: bold;">b</span></div>"#;
    assert_eq!(md(html), "**a b**\n");
}

#[test]
fn test_highlight_span() {
    let html = r#"<span style="--en-highlight:yellow;background-color: rgb(255, 250, 165);">hot</span>"#;
    assert_eq!(md(html), "==hot==\n");
}

#[test]
fn test_font_tags() {
    assert_eq!(md("<font face=\"Courier New\">x_y</font>"), "`x_y`\n");

    let out = run_with("<font face=\"Comic Sans\">x</font>", &ConvertOptions::default());
    assert_eq!(out.text, "x\n");
    assert_eq!(out.diagnostics.count(DiagnosticKind::UnknownFont), 1);
}

// Blocks

#[test]
fn test_divs_start_new_lines() {
    assert_eq!(md("<div>a</div>\n<div>b</div>"), "a\\\nb\n");
    assert_eq!(md("<div>a</div><div><br/></div><div>b</div>"), "a\n\nb\n");
}

#[test]
fn test_paragraphs() {
    assert_eq!(md("<p>one</p><p>two</p>"), "one\\\ntwo\n");
    assert_eq!(md("<p align=\"right\">r</p>"), "<div align=\"right\">r</div>\n");
}

#[test]
fn test_codeblock_div() {
    let html = r#"<div style="-en-codeblock:true;">print(1)</div>"#;
    assert_eq!(md(html), "```bash\nprint(1)\n```\n");
}

#[test]
fn test_codeblock_div_with_lines() {
    let html = r#"<div>Run:</div><div style="-en-codeblock:true;"><div>cd /tmp</div><div>ls -la</div></div><div>done</div>"#;
    assert_eq!(md(html), "Run:\n\n```bash\ncd /tmp\nls -la\n```\n\ndone\n");
}

#[test]
fn test_codeblock_in_list_item() {
    let html = r#"<ul><li><div style="-en-codeblock:true;">x = 1</div><div>after</div></li></ul>"#;
    let out = md(html);
    assert!(out.contains("x = 1\n```\n"), "{out}");
    assert!(!out.contains("```\\"), "{out}");
}

#[test]
fn test_nbsp_between_words() {
    assert_eq!(md("<div>a&nbsp;sun</div>"), "a sun\n");
    assert_eq!(md("<div>a&nbsp;moon</div>"), "a moon\n");
}

#[test]
fn test_pre_keeps_lines() {
    assert_eq!(md("<pre>line1\n  line2</pre>"), "```\nline1\n  line2\n```\n");
}

#[test]
fn test_headings() {
    assert_eq!(md("<h2>Part <b>one</b></h2><div>text</div>"), "## Part **one**\n\ntext\n");
    assert_eq!(md("<h3>Multi<br/>line</h3>"), "### Multi line\n");
}

#[test]
fn test_horizontal_rule() {
    assert_eq!(md("<div>a</div><hr/><div>b</div>"), "a\n\n----\n\nb\n");
}

#[test]
fn test_blockquote() {
    assert_eq!(md("<blockquote>quoted <b>text</b></blockquote>"), "> quoted **text**\n");
}

#[test]
fn test_center() {
    assert_eq!(md("<center>mid</center>"), "<div align=\"center\">mid</div>\n");
}

#[test]
fn test_unknown_tag_passes_text() {
    let out = run_with("<marquee>hi</marquee>", &ConvertOptions::default());
    assert_eq!(out.text, "hi\n");
    assert_eq!(out.diagnostics.count(DiagnosticKind::UnknownTag), 1);
}

// Lists

#[test]
fn test_unordered_list() {
    assert_eq!(md("<ul><li>one</li><li>two</li></ul>"), "- one\n- two\n");
}

#[test]
fn test_ordered_list() {
    assert_eq!(md("<ol><li>a</li><li>b</li></ol>"), "1. a\n1. b\n");
}

#[test]
fn test_nested_list_in_item() {
    let html = "<ul><li>one</li><li>two<ul><li>sub</li></ul></li></ul>";
    assert_eq!(md(html), "- one\n- two\n  - sub\n");
}

#[test]
fn test_nested_ordered_indent() {
    let html = "<ol><li>two<ol><li>sub</li></ol></li></ol>";
    assert_eq!(md(html), "1. two\n   1. sub\n");
}

#[test]
fn test_list_whitespace_ignored() {
    assert_eq!(md("<ul>\n  <li>one</li>\n  <li>two</li>\n</ul>"), "- one\n- two\n");
}

#[test]
fn test_item_style_outside_marker() {
    assert_eq!(md("<ul><li><b>bold item</b></li></ul>"), "- **bold item**\n");
}

#[test]
fn test_checkboxes() {
    let html = r#"<ul><li><input type="checkbox" checked/>done</li><li><input type="checkbox"/>todo</li></ul>"#;
    assert_eq!(md(html), "- [x] done\n- [ ] todo\n");
}

// Links

#[test]
fn test_wikilinks() {
    let out = run_with(r#"<a href="Notes/Trip.html">Trip</a>"#, &ConvertOptions::default());
    assert_eq!(out.text, "[[Notes/Trip]]\n");
    assert_eq!(out.internal_links, vec!["Notes/Trip.html"]);

    assert_eq!(md(r#"<a href="Notes/Trip.html">my trip</a>"#), "[[Notes/Trip|my trip]]\n");
}

#[test]
fn test_encoded_note_link() {
    let out = run_with(r#"<a href="Packing%20list.html">Packing list</a>"#, &ConvertOptions::default());
    assert_eq!(out.text, "[[Packing list]]\n");
    assert_eq!(out.internal_links, vec!["Packing list.html"]);
}

#[test]
fn test_markdown_note_links() {
    let options = ConvertOptions {
        wikilinks: false,
        ..ConvertOptions::default()
    };
    let out = run_with(r#"<a href="Packing%20list.html">list</a>"#, &options);
    assert_eq!(out.text, "[list](Packing%20list.md)\n");
}

#[test]
fn test_styled_note_link_falls_back() {
    let html = r#"<span style="font-weight: bold;"><a href="x.html">X</a></span>"#;
    assert_eq!(md(html), "[**X**](x.md)\n");
}

#[test]
fn test_internal_color_removed() {
    let html = r#"<a href="Other.html" style="color:#69aa35;">Other</a>"#;
    assert_eq!(md(html), "[[Other]]\n");

    let options = ConvertOptions {
        color_internal_links: true,
        wikilinks: false,
        ..ConvertOptions::default()
    };
    let out = run_with(html, &options);
    assert_eq!(out.text, "[<span style=\"color: #69aa35\">Other</span>](Other.md)\n");
}

#[test]
fn test_external_links() {
    assert_eq!(
        md(r#"<a href="https://example.com/a b">site</a>"#),
        "[site](https://example.com/a%20b)\n"
    );

    let html = r#"<a href="https://x.org" style="color: rgb(105, 170, 53);">x</a>"#;
    let out = run_with(html, &ConvertOptions::default());
    assert_eq!(out.diagnostics.count(DiagnosticKind::UnresolvedInternalLink), 1);
    assert!(out.internal_links.is_empty());
}

#[test]
fn test_autolink_kept_verbatim() {
    assert_eq!(md(r#"<a href="https://x.org/a_b">https://x.org/a_b</a>"#), "https://x.org/a_b\n");
}

#[test]
fn test_anchor_and_empty_links() {
    assert_eq!(md(r##"<a href="#top">top</a>"##), "top\n");
    assert_eq!(md("<a name=\"here\">here</a>"), "here\n");

    let out = run_with(r#"<a href="https:">broken</a>"#, &ConvertOptions::default());
    assert_eq!(out.text, "broken\n");
    assert_eq!(out.diagnostics.count(DiagnosticKind::EmptyLink), 1);
}

#[test]
fn test_resource_link() {
    let out = run_with(r#"<a href="Trip_files/notes.txt">notes</a>"#, &ConvertOptions::default());
    assert_eq!(out.text, "[notes](Trip_files/notes.txt)\n");
    assert_eq!(out.resources, vec!["Trip_files/notes.txt"]);
}

#[test]
fn test_media_previews() {
    let html = r#"<a href="Trip_files/scan.pdf"><img src="Trip_files/scan.png"/></a>"#;

    let out = run_with(html, &ConvertOptions::default());
    assert_eq!(out.text, "[scan.pdf](Trip_files/scan.pdf)\n");

    let options = ConvertOptions {
        previews: PreviewMode::Suppressed,
        ..ConvertOptions::default()
    };
    let out = run_with(html, &options);
    assert_eq!(out.text, "[scan.pdf](Trip_files/scan.pdf)\n");
    assert_eq!(out.resources, vec!["Trip_files/scan.pdf"]);

    let options = ConvertOptions {
        previews: PreviewMode::Inlined,
        ..ConvertOptions::default()
    };
    let out = run_with(html, &options);
    assert_eq!(out.text, "[![scan](Trip_files/scan.png)](Trip_files/scan.pdf)\n");
}

// Images

#[test]
fn test_image_dialects() {
    let html = r#"<img src="Trip_files/map%201.png" data-filename="map 1.png" width="300"/>"#;

    let out = run_with(html, &ConvertOptions::default());
    assert_eq!(out.text, "![map 1|300](Trip_files/map%201.png)\n");
    assert_eq!(out.resources, vec!["Trip_files/map 1.png"]);

    let options = ConvertOptions {
        images: ImageDialect::Embed,
        ..ConvertOptions::default()
    };
    assert_eq!(run_with(html, &options).text, "![[Trip_files/map 1.png|300]]\n");

    let options = ConvertOptions {
        images: ImageDialect::Html,
        ..ConvertOptions::default()
    };
    assert_eq!(
        run_with(html, &options).text,
        "<img src=\"Trip_files/map%201.png\" alt=\"map 1\" width=\"300\">\n"
    );
}

#[test]
fn test_image_captions() {
    assert_eq!(md(r#"<img src="a/b.png" alt="A chart"/>"#), "![A chart](a/b.png)\n");
    assert_eq!(md(r#"<img src="a/photo.jpg"/>"#), "![photo](a/photo.jpg)\n");
    assert_eq!(md(r#"<img src="a/x.png" alt="beach.jpg"/>"#), "![beach](a/x.png)\n");
    assert_eq!(
        md(r#"<img src="a/x.png" alt="Fig. 2 overview"/>"#),
        "![Fig. 2 overview](a/x.png)\n"
    );
}

#[test]
fn test_remote_image() {
    let options = ConvertOptions {
        images: ImageDialect::Embed,
        ..ConvertOptions::default()
    };
    let out = run_with(r#"<img src="https://x.org/i.png" alt="remote"/>"#, &options);
    assert_eq!(out.text, "![remote](https://x.org/i.png)\n");
    assert!(out.resources.is_empty());
    assert_eq!(out.diagnostics.count(DiagnosticKind::ExternalImage), 1);
}

// Tables and definition lists

#[test]
fn test_table_two_by_two() {
    let html = "<table><tr><td>a</td><td>b</td></tr><tr><td>c</td><td>d</td></tr></table>";
    assert_eq!(md(html), "|a|b|\n|---|---|\n|c|d|\n");
}

#[test]
fn test_table_lines_and_pipes() {
    let html = "<table>\
        <tr><td>1</td><td>2</td></tr><tr><td>3</td><td>4</td></tr>\
        <tr><td>5</td><td>6</td></tr><tr><td>7</td><td>8</td></tr></table>";
    let out = md(html);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 5);
    assert!(lines.iter().all(|l| l.matches('|').count() == 3));
}

#[test]
fn test_table_empty_rows_skipped() {
    let html = "<table><tr></tr><tr><td>c</td><td>d</td></tr><tr><td>e</td><td>f</td></tr></table>";
    assert_eq!(md(html), "|c|d|\n|---|---|\n|e|f|\n");
    assert_eq!(md("<table><tr></tr><tr><td>only</td></tr></table>"), "only\n");
}

#[test]
fn test_table_merged_cells() {
    let html = r#"<table><tr><td colspan="2">wide</td></tr><tr><td rowspan="2">tall</td><td>a</td></tr><tr><td>b</td></tr></table>"#;
    assert_eq!(md(html), "|wide||\n|---|---|\n|tall|a|\n|^|b|\n");
}

#[test]
fn test_table_cell_content() {
    let html = "<table><tr><td>a|b</td><td>x<br/>y</td></tr><tr><td></td><td>z</td></tr></table>";
    assert_eq!(md(html), "|a\\|b|x<br>y|\n|---|---|\n|&nbsp;|z|\n");
}

#[test]
fn test_single_cell_table_is_plain() {
    assert_eq!(md("<table><tr><td>just <b>text</b></td></tr></table>"), "just **text**\n");
}

#[test]
fn test_table_with_header_group() {
    let html = "<table><thead><tr><th>h</th><th>i</th></tr></thead><tbody><tr><td>1</td><td>2</td></tr></tbody></table>";
    assert_eq!(md(html), "|h|i|\n|---|---|\n|1|2|\n");
}

#[test]
fn test_definitions_html() {
    assert_eq!(
        md("<dl><dt>Term</dt><dd>Meaning</dd></dl>"),
        "<dl><dt>Term</dt><dd>Meaning</dd></dl>\n"
    );
}

#[test]
fn test_definitions_markdown() {
    let options = ConvertOptions {
        definitions: DefinitionStyle::Markdown,
        ..ConvertOptions::default()
    };
    let out = run_with("<dl><dt>Term</dt><dd>Meaning</dd></dl>", &options);
    assert_eq!(out.text, "Term\n: Meaning\n");

    let out = run_with("<dl><dd>orphan</dd></dl>", &options);
    assert_eq!(out.text, "<dl><dd>orphan</dd></dl>\n");
    assert_eq!(out.diagnostics.count(DiagnosticKind::InvalidDefinitionList), 1);
}
