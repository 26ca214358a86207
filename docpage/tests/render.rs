use docpage::doctest::{parse_transcript, render_block};
use docpage::{Page, assemble, render};

const README: &str = "# Title

Intro with an arrow -> and a pause...

## Usage

```javascript
> S.add(1, 2)
3
> sqrt(-1)
Left(\"...\")
> nope
```

```javascript
const f = x => x;
```

### `map :: Functor f => (a -> b) -> f a -> f b`

Maps.
";

#[test]
fn one_plus_one() {
    let block = render_block("> 1 + 1\n", &sandbox::Sandbox);
    assert_eq!(block.matches("<form>").count(), 1);
    assert!(block.contains("<div class=\"output\">2</div>"));
}

#[test]
fn transcripts_are_evaluated_in_place() {
    let html = render(README);
    assert!(html.contains("<input value=\"S.add(1, 2)\">&#160;&gt;"));
    assert!(html.contains("<div class=\"output\">3</div>"));
    assert!(html.contains(
        "<div class=\"output\">Left(&quot;Cannot represent square root of negative number&quot;)</div>"
    ));
    assert!(html.contains(
        "<div class=\"output\" data-error=\"true\">! ReferenceError: nope is not defined</div>"
    ));
    // Expected output written in the README is not shown.
    assert!(!html.contains("Left(\"...\")"));
}

#[test]
fn ordinary_code_blocks_are_left_alone() {
    let html = render(README);
    assert!(html.contains(
        "<pre><code class=\"language-javascript\">const f = x =&gt; x;\n</code></pre>"
    ));
}

#[test]
fn headings_get_ids_and_pilcrows() {
    let html = render(README);
    assert!(html.contains("<h1 id=\"title\">Title</h1>"));
    assert!(html.contains(
        "<a class=\"pilcrow h2\" href=\"#usage\">\u{B6}</a>\n<h2 id=\"usage\">Usage</h2>"
    ));
    assert!(html.contains("<a class=\"pilcrow h3\" href=\"#map--functor-f--a---b---f-a---f-b\">"));
}

#[test]
fn prose_is_typeset() {
    let html = render(README);
    assert!(html.contains(
        "an arrow <span class=\"arrow\"><span class=\"hyphen\">-</span>&gt;</span> and a pause<span class=\"ellipsis\">.&#8202;.&#8202;.</span>"
    ));
    assert!(html.contains("<code>map <span class=\"colons\">:&#8202;:</span> Functor f"));
}

#[test]
fn raw_html_headings_with_names() {
    let html = render("<h3 name=\"chain\"><code>chain</code></h3>\n");
    assert!(html.contains("<a class=\"pilcrow h3\" href=\"#chain\">"));
    assert!(html.contains("<h3 id=\"chain\"><code>chain</code></h3>"));
}

#[test]
fn global_assignments_display_as_declarations() {
    let groups = parse_transcript("> global.xs = [1, 2]\n");
    assert_eq!(groups.len(), 1);
    let block = render_block("> global.xs = [1, 2]\n", &sandbox::Sandbox);
    assert!(block.contains("<input value=\"const xs = [1, 2]\">"));
    assert!(block.contains("<div class=\"output\">[1, 2]</div>"));
}

#[test]
fn heading_sequence_folds_into_nested_lists() {
    let content = "<h1 id=\"a\">A</h1>\n<h2 id=\"b\">B</h2>\n<h3 id=\"c\">C</h3>\n<h2 id=\"d\">D</h2>\n";
    let html = assemble("1.0.0", content);
    let expected = "<ul>
  <li><a href=\"#a\">A</a>
    <ul id=\"toc\">
      <li><a href=\"#b\">B</a>
        <ul>
          <li><a href=\"#c\">C</a>
          </li>
        </ul>
      </li>
      <li><a href=\"#d\">D</a>
      </li>
    </ul>
  </li>
</ul>
";
    assert!(html.contains(expected), "{}", html);
    assert_eq!(html.matches("id=\"toc\"").count(), 1);

    // The list under the title's item holds both h2s; the h3 sits inside the first.
    let toc = html.split("<ul id=\"toc\">").nth(1).unwrap_or_default();
    let under_title = toc.split("\n    </ul>").next().unwrap_or_default();
    assert_eq!(under_title.matches("\n      <li>").count(), 2);
    assert_eq!(under_title.matches("\n          <li>").count(), 1);
}

#[test]
fn full_page() {
    let page = Page::new("3.1.4").with_title("Sanctuary");
    let html = docpage::generate(README, &page);
    assert!(html.contains("<title>Sanctuary</title>"));
    assert!(html.contains("v3.1.4"));
    assert!(html.contains("<li><a href=\"#usage\">Usage</a>"));
    assert!(html.contains("<li><a href=\"#map--functor-f--a---b---f-a---f-b\"><code>map"));
}
