use std::fmt::Write;

use crate::compose::{CatalogueLayout, Cover};
use crate::decorate::PageDecoration;
use crate::product::ProductBlock;
use crate::resolver::RasterImage;
use crate::style::{self, BODY_HEIGHT, BODY_WIDTH, DisplayBox};
use crate::token::{FormattingToken, Span};

/// Virtual path of the logo inside the Typst world.
pub const LOGO_PATH: &str = "assets/logo.png";

/// Virtual path of a product image. Both indices start at 1.
pub fn product_image_path(block: usize, slot: usize) -> String {
    format!("assets/p{block}-{slot}.png")
}

/// Every image the generated source references, keyed by virtual path.
pub fn assets(layout: &CatalogueLayout) -> Vec<(String, &[u8])> {
    let mut assets = Vec::new();
    if let Some(logo) = &layout.logo {
        assets.push((LOGO_PATH.to_string(), logo.png.as_slice()));
    }
    for (i, block) in layout.blocks.iter().enumerate() {
        for (j, image) in block.images.iter().enumerate() {
            assets.push((product_image_path(i + 1, j + 1), image.png.as_slice()));
        }
    }
    assets
}

/// Convert a laid-out catalogue to Typst markup.
///
/// `decorations[n]` is shown on physical page `n + 1`; pages beyond the
/// slice get no header or footer.
pub fn layout_to_typst(layout: &CatalogueLayout, decorations: &[PageDecoration]) -> String {
    let mut out = String::new();

    out.push_str("#let decorations = (\n");
    for deco in decorations {
        decoration_to_typst(deco, &mut out);
    }
    out.push_str(")\n\n");

    out.push_str(&page_setup());

    if let Some(logo) = &layout.logo {
        let _ = writeln!(
            out,
            "#align(center, {})\n#v(14pt)\n",
            image_call(LOGO_PATH, logo)
        );
    }

    cover_to_typst(&layout.cover, &mut out);

    for (i, block) in layout.blocks.iter().enumerate() {
        block_to_typst(i + 1, block, &mut out);
    }

    out
}

fn page_setup() -> String {
    format!(
        concat!(
            "#set page(\n",
            "  width: {pw}pt,\n",
            "  height: {ph}pt,\n",
            "  margin: (x: {mx}pt, top: {mt}pt, bottom: {mb}pt),\n",
            "  header: context {{\n",
            "    let deco = decorations.at(here().page() - 1, default: none)\n",
            "    if deco != none {{ deco.header }}\n",
            "  }},\n",
            "  footer: context {{\n",
            "    let deco = decorations.at(here().page() - 1, default: none)\n",
            "    if deco != none {{ deco.footer }}\n",
            "  }},\n",
            ")\n",
            "#set text(size: {size}pt, fill: rgb(\"{fill}\"))\n",
            "#set par(linebreaks: \"optimized\")\n\n",
        ),
        pw = pt(style::PAGE_WIDTH),
        ph = pt(style::PAGE_HEIGHT),
        mx = pt(style::MARGIN_X),
        mt = pt(style::MARGIN_TOP),
        mb = pt(style::MARGIN_BOTTOM),
        size = pt(style::BODY_SIZE),
        fill = style::BODY_TEXT,
    )
}

fn decoration_to_typst(deco: &PageDecoration, out: &mut String) {
    out.push_str("  (\n");
    let _ = writeln!(
        out,
        "    header: block(width: 100%, fill: rgb(\"{}\"), inset: (x: 8pt, y: 5pt), radius: 2pt, \
         grid(columns: (1fr, auto), align: horizon, \
         text(fill: white, weight: \"bold\", {}), \
         text(fill: white, size: {}pt, {}))),",
        style::HEADER_BAND,
        str_lit(&deco.header.branding),
        pt(style::FOOTER_SIZE),
        str_lit(&deco.header.page_label),
    );

    let columns: Vec<String> = deco
        .footer
        .columns
        .iter()
        .enumerate()
        .map(|(i, lines)| footer_column(i == 0, lines))
        .collect();
    let _ = writeln!(
        out,
        "    footer: block(width: 100%, fill: rgb(\"{}\"), inset: 8pt, radius: 2pt, {{\n      \
         grid(columns: (1fr, 1fr, 1fr), column-gutter: 8pt, {})\n      \
         v(6pt)\n      \
         align(center, text(size: 7pt, fill: rgb(\"{}\"), {}))\n    }}),",
        style::FOOTER_BAND,
        columns.join(", "),
        style::FOOTER_MUTED,
        str_lit(&deco.footer.copyright),
    );
    out.push_str("  ),\n");
}

fn footer_column(emphasise_first: bool, lines: &[String]) -> String {
    if lines.is_empty() {
        return "[]".to_string();
    }
    let texts: Vec<String> = lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            if emphasise_first && i == 0 {
                format!(
                    "text(size: {}pt, weight: \"bold\", fill: rgb(\"{}\"), {})",
                    pt(style::FOOTER_COMPANY_SIZE),
                    style::FOOTER_TEXT,
                    str_lit(line)
                )
            } else {
                format!(
                    "text(size: {}pt, fill: rgb(\"{}\"), {})",
                    pt(style::FOOTER_SIZE),
                    style::FOOTER_TEXT,
                    str_lit(line)
                )
            }
        })
        .collect();
    format!("stack(spacing: 3pt, {})", texts.join(", "))
}

fn cover_to_typst(cover: &Cover, out: &mut String) {
    let _ = writeln!(
        out,
        "#align(center, text(size: {}pt, weight: \"bold\", fill: rgb(\"{}\"), {}))",
        pt(style::TITLE_SIZE),
        style::TITLE,
        str_lit(&cover.title)
    );
    let _ = writeln!(
        out,
        "#align(center, text(size: {}pt, fill: rgb(\"{}\"), {}))",
        pt(style::SUBTITLE_SIZE),
        style::SUBTITLE,
        str_lit(&cover.subtitle)
    );
    let _ = writeln!(
        out,
        "#align(center, text(size: 9pt, fill: rgb(\"{}\"), {}))",
        style::FOOTER_MUTED,
        str_lit(&cover.generated_on)
    );
    let _ = writeln!(
        out,
        "#v(10pt)\n#align(center, table(columns: 2, inset: 6pt, stroke: 0.5pt + rgb(\"{}\"), \
         text(weight: \"bold\", \"Products\"), {}, \
         text(weight: \"bold\", \"Categories\"), {}))\n#v(24pt)\n",
        style::SEPARATOR,
        str_lit(&cover.product_count.to_string()),
        str_lit(&cover.category_count.to_string()),
    );
}

fn block_to_typst(index: usize, block: &ProductBlock, out: &mut String) {
    // Typst measures the finished block; only one taller than the page body
    // may split across pages.
    out.push_str("#context {\n  let body = {\n");

    let _ = writeln!(
        out,
        "    block(below: 8pt, text(size: {}pt, weight: \"bold\", fill: rgb(\"{}\"), {}))",
        pt(style::PRODUCT_NAME_SIZE),
        style::PRODUCT_NAME,
        str_lit(&block.title)
    );
    let _ = writeln!(
        out,
        "    block(below: 5pt, text(weight: \"bold\", fill: rgb(\"{}\"), \"Category: \") \
         + text(fill: rgb(\"{}\"), {}))",
        style::CATEGORY_LABEL,
        style::CATEGORY_VALUE,
        str_lit(&block.category)
    );
    let _ = writeln!(
        out,
        "    block(below: 8pt, text(size: {}pt, weight: \"bold\", fill: rgb(\"{}\"), {}))",
        pt(style::PRICE_SIZE),
        style::PRICE,
        str_lit(&format!("Price: {}", block.price))
    );

    if !block.description.is_empty() {
        out.push_str("    block(below: 10pt, {\n");
        description_to_typst(&block.description, "      ", out);
        out.push_str("    })\n");
    }

    if !block.images.is_empty() {
        let cells: Vec<String> = block
            .images
            .iter()
            .enumerate()
            .map(|(j, image)| image_call(&product_image_path(index, j + 1), image))
            .collect();
        let _ = writeln!(
            out,
            "    block(below: 10pt, grid(columns: {}, column-gutter: {}pt, \
             align: center + horizon, {}))",
            cells.len(),
            pt(style::IMAGE_GUTTER),
            cells.join(", ")
        );
    }

    if !block.links.is_empty() {
        let links: Vec<String> = block
            .links
            .iter()
            .map(|l| format!("link({}, {})", str_lit(&l.url), str_lit(&l.label)))
            .collect();
        let _ = writeln!(
            out,
            "    block(below: 8pt, text(size: 9pt, fill: rgb(\"{}\"), {}))",
            style::LINK,
            links.join(" + h(12pt) + ")
        );
    }

    let _ = writeln!(
        out,
        "    line(length: 100%, stroke: 1.5pt + rgb(\"{}\"))",
        style::SEPARATOR
    );
    out.push_str("  }\n");
    let _ = writeln!(
        out,
        "  block(breakable: measure(body, width: {}pt).height > {}pt, width: 100%, body)",
        pt(BODY_WIDTH),
        pt(BODY_HEIGHT)
    );
    let _ = writeln!(out, "}}\n#v({}pt)\n", pt(style::BLOCK_SPACING));
}

/// Emit description tokens as code-mode statements, one per line.
///
/// Line breaks are deferred until more text follows so that a paragraph
/// never ends in an empty line. A break with no open line is a blank line
/// and becomes vertical space.
fn description_to_typst(tokens: &[FormattingToken], indent: &str, out: &mut String) {
    let mut line_open = false;
    let mut pending_break = false;
    let mut items: Vec<String> = Vec::new();

    for token in tokens {
        match token {
            FormattingToken::Run(span) => {
                if pending_break {
                    let _ = writeln!(out, "{indent}linebreak()");
                    pending_break = false;
                }
                let _ = writeln!(out, "{indent}{}", span_to_typst(span));
                line_open = true;
            }
            FormattingToken::LineBreak if line_open => {
                pending_break = true;
                line_open = false;
            }
            FormattingToken::LineBreak => {
                pending_break = false;
                let _ = writeln!(out, "{indent}v({}pt)", pt(style::PARAGRAPH_SPACING));
            }
            FormattingToken::ListStart => {
                pending_break = false;
                line_open = false;
                items.clear();
            }
            FormattingToken::ListItem(spans) => {
                items.push(spans_to_typst(spans));
            }
            FormattingToken::ListEnd => {
                let _ = writeln!(
                    out,
                    "{indent}list(marker: [•], indent: 8pt, {})",
                    items.join(", ")
                );
                items.clear();
            }
        }
    }
}

fn spans_to_typst(spans: &[Span]) -> String {
    if spans.is_empty() {
        return "[]".to_string();
    }
    spans
        .iter()
        .map(span_to_typst)
        .collect::<Vec<_>>()
        .join(" + ")
}

fn span_to_typst(span: &Span) -> String {
    match span {
        Span::Plain(text) => format!("text({})", str_lit(text)),
        Span::Bold(text) => format!("strong({})", str_lit(text)),
        Span::Italic(text) => format!("emph({})", str_lit(text)),
    }
}

fn image_call(path: &str, image: &RasterImage) -> String {
    let DisplayBox { width, height } = image.display;
    format!(
        "image({}, width: {}pt, height: {}pt)",
        str_lit(path),
        pt(width),
        pt(height)
    )
}

/// A Typst string literal. User text only ever reaches the output this way,
/// so none of it can be read as markup.
pub fn str_lit(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{{{:x}}}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Lengths with two decimals at most, so output is stable across runs.
fn pt(value: f64) -> String {
    let fixed = format!("{value:.2}");
    fixed
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}
