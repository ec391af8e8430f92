//! Cover-letter templates.

use crate::models::design::{ResolvedDesign, Rgb};
use crate::models::document::CoverLetter;
use crate::render::blocks::{contact_line, letter_body, signature_block, text, Palette};
use crate::render::templates::{LetterTemplate, RenderOptions};
use crate::render::tree::{Align, BoxNode, Edges, Node, VisualTree};

pub fn render(letter: &CoverLetter, template: LetterTemplate, options: &RenderOptions) -> VisualTree {
    let d = letter.design.resolve();
    let root = match template {
        LetterTemplate::Professional => professional(letter, &d, options),
        LetterTemplate::Modern => modern(letter, &d, options),
        LetterTemplate::Classic => classic(letter, &d, options),
    };
    VisualTree::new(d.font, root)
}

fn sender_block(letter: &CoverLetter, d: &ResolvedDesign, p: &Palette, align: Align) -> Option<Node> {
    let mut block = BoxNode::column("sender").gap(4.0);
    let name = letter.sender.full_name.trim();
    if !name.is_empty() {
        block = block.child(text(name, d.name_size_px() * 0.8, p.text, d).bold().align(align));
    }
    let title = letter.sender.job_title.trim();
    if !title.is_empty() {
        block = block.child(text(title, d.base_size_px, p.accent, d).align(align));
    }
    if let Some(contact) = contact_line(&letter.sender.contact_items(), d, p.muted, align) {
        block = block.child(contact);
    }
    (!block.children.is_empty()).then(|| block.into())
}

/// Date line, recipient address, then the letter itself and the signature.
fn letter_column(letter: &CoverLetter, d: &ResolvedDesign, p: &Palette, options: &RenderOptions) -> Vec<Node> {
    let mut nodes = Vec::new();
    if let Some(date) = options.date_line.as_deref().filter(|s| !s.trim().is_empty()) {
        nodes.push(text(date.trim(), d.base_size_px, p.muted, d).into());
    }
    let recipient = letter.recipient.lines();
    if !recipient.is_empty() {
        nodes.push(
            BoxNode::column("recipient")
                .gap(2.0)
                .children(recipient.into_iter().map(|l| text(l, d.base_size_px, p.text, d).into()))
                .into(),
        );
    }
    nodes.push(
        BoxNode::column("letter-body")
            .gap(d.base_size_px)
            .children(letter_body(&letter.content, d, p))
            .into(),
    );
    nodes.push(signature_block(&letter.signature, &letter.sender.full_name, d, p));
    nodes
}

fn professional(letter: &CoverLetter, d: &ResolvedDesign, options: &RenderOptions) -> BoxNode {
    let p = Palette::standard(d);
    let mut page = BoxNode::column("page letter-professional")
        .background(Rgb::WHITE)
        .padding(Edges::xy(64.0, 56.0))
        .gap(24.0);
    if let Some(sender) = sender_block(letter, d, &p, Align::Left) {
        page = page.child(
            BoxNode::column("letterhead")
                .padding(Edges {
                    bottom: 12.0,
                    ..Edges::default()
                })
                .border_bottom(2.0, d.accent)
                .child(sender),
        );
    }
    page.children(letter_column(letter, d, &p, options))
}

/// Narrow accent strip down the left edge.
fn modern(letter: &CoverLetter, d: &ResolvedDesign, options: &RenderOptions) -> BoxNode {
    let p = Palette::standard(d);
    let strip = BoxNode::column("accent-strip")
        .fraction(0.025)
        .background(d.accent);
    let mut content = BoxNode::column("content")
        .padding(Edges::xy(48.0, 56.0))
        .gap(24.0);
    if let Some(sender) = sender_block(letter, d, &p, Align::Left) {
        content = content.child(sender);
    }
    content = content.children(letter_column(letter, d, &p, options));

    BoxNode::row("page letter-modern")
        .background(Rgb::WHITE)
        .child(strip)
        .child(content)
}

fn classic(letter: &CoverLetter, d: &ResolvedDesign, options: &RenderOptions) -> BoxNode {
    let p = Palette {
        accent: Rgb::INK,
        ..Palette::standard(d)
    };
    let mut page = BoxNode::column("page letter-classic")
        .background(Rgb::WHITE)
        .padding(Edges::xy(72.0, 64.0))
        .gap(22.0);
    if let Some(sender) = sender_block(letter, d, &p, Align::Center) {
        page = page.child(sender).child(Node::Rule {
            thickness_px: 0.75,
            color: Rgb::HAIRLINE,
        });
    }
    page.children(letter_column(letter, d, &p, options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::signature::SignatureMode;

    fn sample() -> CoverLetter {
        let mut letter = CoverLetter::default();
        letter.sender.full_name = "Ada Lovelace".into();
        letter.sender.email = "ada@example.com".into();
        letter.recipient.company = "Analytical Engines Ltd".into();
        letter.content.subject = "Programmer".into();
        letter.content.opening = "Dear hiring team,".into();
        letter.append_paragraph("First.");
        letter.append_paragraph("Second.");
        letter.content.closing = "Kind regards,".into();
        letter.signature.typed_text = "Ada".into();
        letter
    }

    fn texts(node: &Node, out: &mut Vec<String>) {
        match node {
            Node::Text(t) => out.push(t.text.clone()),
            Node::Box(b) => b.children.iter().for_each(|c| texts(c, out)),
            _ => {}
        }
    }

    fn all_text(tree: &VisualTree) -> Vec<String> {
        let mut out = Vec::new();
        tree.root.children.iter().for_each(|c| texts(c, &mut out));
        out
    }

    #[test]
    fn test_body_paragraphs_render_in_order() {
        let tree = render(&sample(), LetterTemplate::Professional, &RenderOptions::default());
        let out = all_text(&tree);
        let first = out.iter().position(|t| t == "First.").unwrap();
        let second = out.iter().position(|t| t == "Second.").unwrap();
        let closing = out.iter().position(|t| t == "Kind regards,").unwrap();
        assert!(first < second && second < closing);
    }

    #[test]
    fn test_date_line_comes_from_options() {
        let options = RenderOptions {
            date_line: Some("18 October 2026".into()),
        };
        for template in [
            LetterTemplate::Professional,
            LetterTemplate::Modern,
            LetterTemplate::Classic,
        ] {
            let out = all_text(&render(&sample(), template, &options));
            assert!(out.contains(&"18 October 2026".to_string()), "{template:?}");
        }
        let out = all_text(&render(&sample(), LetterTemplate::Classic, &RenderOptions::default()));
        assert!(!out.iter().any(|t| t.contains("2026")));
    }

    #[test]
    fn test_drawn_signature_renders_image() {
        let mut letter = sample();
        letter.signature.drawn_image = Some("data:image/png;base64,AAAA".into());
        letter.signature.set_mode(SignatureMode::Drawn);
        let tree = render(&letter, LetterTemplate::Modern, &RenderOptions::default());
        assert_eq!(tree.image_sources(), vec!["data:image/png;base64,AAAA"]);
        assert!(!all_text(&tree).contains(&"Ada".to_string()));
    }

    #[test]
    fn test_empty_letter_still_renders() {
        let tree = render(
            &CoverLetter::default(),
            LetterTemplate::Professional,
            &RenderOptions::default(),
        );
        assert!(all_text(&tree).is_empty());
        assert_eq!(tree.width_px, 794.0);
    }
}
