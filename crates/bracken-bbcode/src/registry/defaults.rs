//! The built-in tag set.
//!
//! Each entry is data: matchers for the reverse direction, classification
//! flags, and the two renderers. Hosting applications extend or replace
//! these through the registry's admin surface before the first conversion.

use bracken_common::escape::{entities, sanitize_uri};
use bracken_dom::{AttributeList, NodeId};

use super::{
    CloseTrigger, DEFAULT_ATTRIBUTE, ElementMatcher, HtmlRender, MarkupContext, MarkupRender,
    StyleMatcher, TagDefinition, TagRegistry,
};

/// Match on the element name alone.
fn tag(name: &str) -> ElementMatcher {
    ElementMatcher {
        element: Some(name.to_string()),
        ..ElementMatcher::default()
    }
}

/// Match on the element name plus a required attribute.
fn tag_with_attr(name: &str, attr: &str) -> ElementMatcher {
    ElementMatcher {
        element: Some(name.to_string()),
        attributes: vec![attr.to_string()],
        ..ElementMatcher::default()
    }
}

/// Match any element carrying the given inline-style property.
fn styled(property: &str, values: Option<&[&str]>) -> ElementMatcher {
    ElementMatcher {
        element: None,
        attributes: Vec::new(),
        styles: vec![StyleMatcher {
            property: property.to_string(),
            values: values.map(|vs| vs.iter().map(ToString::to_string).collect()),
        }],
    }
}

fn html(template: &str) -> HtmlRender {
    HtmlRender::Template(template.to_string())
}

fn markup(template: &str) -> MarkupRender {
    MarkupRender::Template(template.to_string())
}

/// Base definition for block-level tags.
fn block() -> TagDefinition {
    TagDefinition {
        is_inline: false,
        skip_last_trailing_break: true,
        ..TagDefinition::default()
    }
}

/// Triggers that terminate a list item: the next item or the list's end.
fn list_item_closers() -> Vec<CloseTrigger> {
    vec![
        CloseTrigger::open("li"),
        CloseTrigger::open("*"),
        CloseTrigger::close("ul"),
        CloseTrigger::close("ol"),
    ]
}

pub(super) fn install(registry: &mut TagRegistry) {
    registry.install(
        "b",
        TagDefinition {
            matches: vec![
                tag("b"),
                tag("strong"),
                styled(
                    "font-weight",
                    Some(&["bold", "bolder", "401", "700", "800", "900"]),
                ),
            ],
            to_html: html("<strong>{0}</strong>"),
            to_markup: markup("[b]{0}[/b]"),
            ..TagDefinition::default()
        },
    );
    registry.install(
        "i",
        TagDefinition {
            matches: vec![
                tag("i"),
                tag("em"),
                styled("font-style", Some(&["italic", "oblique"])),
            ],
            to_html: html("<em>{0}</em>"),
            to_markup: markup("[i]{0}[/i]"),
            ..TagDefinition::default()
        },
    );
    registry.install(
        "u",
        TagDefinition {
            matches: vec![
                tag("u"),
                styled("text-decoration", Some(&["underline"])),
                styled("text-decoration-line", Some(&["underline"])),
            ],
            to_html: html("<u>{0}</u>"),
            to_markup: markup("[u]{0}[/u]"),
            ..TagDefinition::default()
        },
    );
    registry.install(
        "s",
        TagDefinition {
            matches: vec![
                tag("s"),
                tag("strike"),
                styled("text-decoration", Some(&["line-through"])),
            ],
            to_html: html("<s>{0}</s>"),
            to_markup: markup("[s]{0}[/s]"),
            ..TagDefinition::default()
        },
    );
    registry.install(
        "sub",
        TagDefinition {
            matches: vec![tag("sub")],
            to_html: html("<sub>{0}</sub>"),
            to_markup: markup("[sub]{0}[/sub]"),
            ..TagDefinition::default()
        },
    );
    registry.install(
        "sup",
        TagDefinition {
            matches: vec![tag("sup")],
            to_html: html("<sup>{0}</sup>"),
            to_markup: markup("[sup]{0}[/sup]"),
            ..TagDefinition::default()
        },
    );
    registry.install(
        "font",
        TagDefinition {
            matches: vec![tag_with_attr("font", "face"), styled("font-family", None)],
            to_html: HtmlRender::Func(font_to_html),
            to_markup: MarkupRender::Func(font_to_markup),
            ..TagDefinition::default()
        },
    );
    registry.install(
        "size",
        TagDefinition {
            matches: vec![tag_with_attr("font", "size"), styled("font-size", None)],
            to_html: HtmlRender::Func(size_to_html),
            to_markup: MarkupRender::Func(size_to_markup),
            ..TagDefinition::default()
        },
    );
    registry.install(
        "color",
        TagDefinition {
            matches: vec![tag_with_attr("font", "color"), styled("color", None)],
            to_html: HtmlRender::Func(color_to_html),
            to_markup: MarkupRender::Func(color_to_markup),
            ..TagDefinition::default()
        },
    );
    registry.install(
        "ul",
        TagDefinition {
            matches: vec![tag("ul")],
            to_html: html("<ul>{0}</ul>"),
            to_markup: markup("[ul]{0}[/ul]"),
            ..block()
        },
    );
    registry.install(
        "ol",
        TagDefinition {
            matches: vec![tag("ol")],
            to_html: html("<ol>{0}</ol>"),
            to_markup: markup("[ol]{0}[/ol]"),
            ..block()
        },
    );
    registry.install(
        "li",
        TagDefinition {
            matches: vec![tag("li")],
            closed_by: list_item_closers(),
            to_html: html("<li>{0}</li>"),
            to_markup: markup("[li]{0}[/li]"),
            ..block()
        },
    );
    registry.install(
        "*",
        TagDefinition {
            closed_by: list_item_closers(),
            exclude_closing: true,
            to_html: html("<li>{0}</li>"),
            to_markup: markup("[*]{0}"),
            ..block()
        },
    );
    registry.install(
        "table",
        TagDefinition {
            matches: vec![tag("table")],
            allowed_children: Some(vec!["tr".to_string()]),
            to_html: html("<table>{0}</table>"),
            to_markup: markup("[table]{0}[/table]"),
            ..block()
        },
    );
    registry.install(
        "tr",
        TagDefinition {
            matches: vec![tag("tr")],
            closed_by: vec![CloseTrigger::open("tr"), CloseTrigger::close("table")],
            allowed_children: Some(vec!["td".to_string(), "th".to_string()]),
            to_html: html("<tr>{0}</tr>"),
            to_markup: markup("[tr]{0}[/tr]"),
            ..block()
        },
    );
    registry.install(
        "th",
        TagDefinition {
            matches: vec![tag("th")],
            closed_by: table_cell_closers(),
            to_html: html("<th>{0}</th>"),
            to_markup: markup("[th]{0}[/th]"),
            ..block()
        },
    );
    registry.install(
        "td",
        TagDefinition {
            matches: vec![tag("td")],
            closed_by: table_cell_closers(),
            to_html: html("<td>{0}</td>"),
            to_markup: markup("[td]{0}[/td]"),
            ..block()
        },
    );
    registry.install(
        "hr",
        TagDefinition {
            matches: vec![tag("hr")],
            is_self_closing: true,
            allows_empty: true,
            to_html: html("<hr />"),
            to_markup: markup("[hr]"),
            ..block()
        },
    );
    registry.install(
        "img",
        TagDefinition {
            matches: vec![tag_with_attr("img", "src")],
            allows_empty: true,
            allowed_children: Some(vec!["#".to_string()]),
            to_html: HtmlRender::Func(img_to_html),
            to_markup: MarkupRender::Func(img_to_markup),
            ..TagDefinition::default()
        },
    );
    registry.install(
        "url",
        TagDefinition {
            matches: vec![tag_with_attr("a", "href")],
            to_html: HtmlRender::Func(url_to_html),
            to_markup: MarkupRender::Func(url_to_markup),
            ..TagDefinition::default()
        },
    );
    registry.install(
        "email",
        TagDefinition {
            // No matchers: mailto links match `url` first on the way back.
            to_html: HtmlRender::Func(email_to_html),
            to_markup: markup("[email]{0}[/email]"),
            ..TagDefinition::default()
        },
    );
    registry.install(
        "quote",
        TagDefinition {
            matches: vec![tag("blockquote")],
            to_html: HtmlRender::Func(quote_to_html),
            to_markup: MarkupRender::Func(quote_to_markup),
            ..block()
        },
    );
    registry.install(
        "code",
        TagDefinition {
            matches: vec![tag("code")],
            block_container_only: true,
            allowed_children: Some(vec!["#".to_string()]),
            to_html: html("<code>{0}</code>"),
            to_markup: markup("[code]{0}[/code]"),
            ..block()
        },
    );
    for align in ["left", "center", "right", "justify"] {
        registry.install(
            align,
            TagDefinition {
                matches: vec![styled("text-align", Some(&[align]))],
                to_html: html(&format!("<div style=\"text-align: {align}\">{{0}}</div>")),
                to_markup: markup(&format!("[{align}]{{0}}[/{align}]")),
                ..block()
            },
        );
    }
}

fn table_cell_closers() -> Vec<CloseTrigger> {
    vec![
        CloseTrigger::open("td"),
        CloseTrigger::open("th"),
        CloseTrigger::open("tr"),
        CloseTrigger::close("tr"),
        CloseTrigger::close("table"),
    ]
}

// ============================================================================
// Tag → HTML renderers
// ============================================================================

fn font_to_html(attrs: &AttributeList, content: &str) -> String {
    let face = attrs.get(DEFAULT_ATTRIBUTE).unwrap_or("inherit");
    format!(
        "<span style=\"font-family: {}\">{content}</span>",
        entities(face)
    )
}

/// Font size keywords for bracket sizes 1-7.
const FONT_SIZES: &[&str] = &[
    "xx-small", "x-small", "small", "medium", "large", "x-large", "xx-large",
];

fn size_to_html(attrs: &AttributeList, content: &str) -> String {
    let size = attrs
        .get(DEFAULT_ATTRIBUTE)
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|n| (1..=FONT_SIZES.len()).contains(n));
    match size {
        Some(n) => format!(
            "<span style=\"font-size: {}\">{content}</span>",
            FONT_SIZES[n - 1]
        ),
        None => content.to_string(),
    }
}

fn color_to_html(attrs: &AttributeList, content: &str) -> String {
    match attrs.get(DEFAULT_ATTRIBUTE) {
        Some(color) => format!(
            "<span style=\"color: {}\">{content}</span>",
            entities(color)
        ),
        None => content.to_string(),
    }
}

fn url_to_html(attrs: &AttributeList, content: &str) -> String {
    // The bracket value wins; without one the link text is the target.
    // Rendered children are already entity-escaped, so only the raw
    // attribute path escapes here.
    let href = attrs.get(DEFAULT_ATTRIBUTE).map_or_else(
        || sanitize_uri(content).to_string(),
        |v| entities(sanitize_uri(v)),
    );
    format!("<a href=\"{href}\">{content}</a>")
}

fn email_to_html(attrs: &AttributeList, content: &str) -> String {
    let address = attrs
        .get(DEFAULT_ATTRIBUTE)
        .map_or_else(|| content.to_string(), entities);
    format!("<a href=\"mailto:{address}\">{content}</a>")
}

fn img_to_html(attrs: &AttributeList, content: &str) -> String {
    let mut dimensions = String::new();
    // `[img=WxH]`, or explicit width=/height= attributes.
    let (width, height) = match attrs.get(DEFAULT_ATTRIBUTE).and_then(|v| v.split_once('x')) {
        Some((w, h)) => (Some(w.to_string()), Some(h.to_string())),
        None => (
            attrs.get("width").map(ToString::to_string),
            attrs.get("height").map(ToString::to_string),
        ),
    };
    if let Some(w) = width
        && w.chars().all(|c| c.is_ascii_digit())
        && !w.is_empty()
    {
        dimensions.push_str(&format!(" width=\"{w}\""));
    }
    if let Some(h) = height
        && h.chars().all(|c| c.is_ascii_digit())
        && !h.is_empty()
    {
        dimensions.push_str(&format!(" height=\"{h}\""));
    }
    format!("<img{dimensions} src=\"{}\" />", sanitize_uri(content))
}

fn quote_to_html(attrs: &AttributeList, content: &str) -> String {
    match attrs.get(DEFAULT_ATTRIBUTE) {
        Some(author) => format!(
            "<blockquote><cite>{}</cite>{content}</blockquote>",
            entities(author)
        ),
        None => format!("<blockquote>{content}</blockquote>"),
    }
}

// ============================================================================
// Element → markup renderers
// ============================================================================

fn default_attrs(value: &str) -> AttributeList {
    AttributeList::from_pairs([(DEFAULT_ATTRIBUTE, value)])
}

fn font_to_markup(ctx: &MarkupContext<'_>, id: NodeId, content: &str) -> String {
    let face = ctx
        .tree
        .as_element(id)
        .and_then(|e| {
            e.attr("face")
                .map(ToString::to_string)
                .or_else(|| e.style("font-family"))
        })
        .unwrap_or_default();
    format!(
        "{}{content}[/font]",
        ctx.opening_tag("font", &default_attrs(&face), None)
    )
}

fn size_to_markup(ctx: &MarkupContext<'_>, id: NodeId, content: &str) -> String {
    let bucket = ctx.tree.as_element(id).and_then(|e| {
        e.attr("size")
            .and_then(size_bucket)
            .or_else(|| e.style("font-size").as_deref().and_then(size_bucket))
    });
    match bucket {
        Some(n) => format!(
            "{}{content}[/size]",
            ctx.opening_tag("size", &default_attrs(&n.to_string()), None)
        ),
        None => content.to_string(),
    }
}

/// Map a size attribute, keyword, or pixel length to a bracket size 1-7.
fn size_bucket(value: &str) -> Option<usize> {
    let value = value.trim();
    if let Ok(n) = value.parse::<usize>() {
        return (1..=FONT_SIZES.len()).contains(&n).then_some(n);
    }
    if let Some(pos) = FONT_SIZES.iter().position(|k| k.eq_ignore_ascii_case(value)) {
        return Some(pos + 1);
    }
    let px = value
        .strip_suffix("px")
        .and_then(|n| n.trim().parse::<f32>().ok())?;
    let bucket = match px {
        px if px <= 9.0 => 1,
        px if px <= 11.0 => 2,
        px if px <= 14.0 => 3,
        px if px <= 17.0 => 4,
        px if px <= 20.0 => 5,
        px if px <= 28.0 => 6,
        _ => 7,
    };
    Some(bucket)
}

fn color_to_markup(ctx: &MarkupContext<'_>, id: NodeId, content: &str) -> String {
    let color = ctx.tree.as_element(id).and_then(|e| {
        e.attr("color")
            .map(ToString::to_string)
            .or_else(|| e.style("color"))
    });
    match color {
        Some(c) => format!(
            "{}{content}[/color]",
            ctx.opening_tag("color", &default_attrs(&normalize_color(&c)), None)
        ),
        None => content.to_string(),
    }
}

/// Normalize `rgb(r, g, b)` and `#rgb` notations to `#rrggbb`; anything
/// else (named colors, already-long hex) passes through.
fn normalize_color(value: &str) -> String {
    let value = value.trim();
    if let Some(body) = value
        .strip_prefix("rgb(")
        .and_then(|v| v.strip_suffix(')'))
    {
        let channels: Vec<u8> = body
            .split(',')
            .filter_map(|c| c.trim().parse::<u8>().ok())
            .collect();
        if let [r, g, b] = channels[..] {
            return format!("#{r:02x}{g:02x}{b:02x}");
        }
    }
    if value.len() == 4
        && let Some(short) = value.strip_prefix('#')
        && short.chars().all(|c| c.is_ascii_hexdigit())
    {
        let mut long = String::with_capacity(7);
        long.push('#');
        for c in short.chars() {
            long.push(c);
            long.push(c);
        }
        return long;
    }
    value.to_string()
}

fn url_to_markup(ctx: &MarkupContext<'_>, id: NodeId, content: &str) -> String {
    let href = ctx
        .tree
        .as_element(id)
        .and_then(|e| e.attr("href"))
        .unwrap_or_default();
    format!(
        "{}{content}[/url]",
        ctx.opening_tag("url", &default_attrs(href), None)
    )
}

fn img_to_markup(ctx: &MarkupContext<'_>, id: NodeId, _content: &str) -> String {
    let Some(element) = ctx.tree.as_element(id) else {
        return String::new();
    };
    let src = element.attr("src").unwrap_or_default();
    match (element.attr("width"), element.attr("height")) {
        (Some(w), Some(h)) => format!(
            "{}{src}[/img]",
            ctx.opening_tag("img", &default_attrs(&format!("{w}x{h}")), None)
        ),
        _ => format!("[img]{src}[/img]"),
    }
}

fn quote_to_markup(ctx: &MarkupContext<'_>, id: NodeId, content: &str) -> String {
    // A leading <cite> child carries the author; its text opens the quote
    // and is stripped from the front of the rendered children.
    let author = ctx
        .tree
        .children(id)
        .iter()
        .find_map(|&child| {
            ctx.tree
                .as_element(child)
                .filter(|e| e.tag_name == "cite")
                .map(|_| {
                    // Match the serializer's whitespace collapsing so the
                    // prefix strip below lines up.
                    ctx.tree
                        .text_content(child)
                        .split_whitespace()
                        .collect::<Vec<_>>()
                        .join(" ")
                })
        })
        .filter(|text| !text.is_empty());
    match author {
        Some(author) => {
            let body = content.strip_prefix(author.as_str()).unwrap_or(content);
            format!(
                "{}{body}[/quote]",
                ctx.opening_tag("quote", &default_attrs(&author), None)
            )
        }
        None => format!("[quote]{content}[/quote]"),
    }
}
