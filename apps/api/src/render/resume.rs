//! Résumé templates. Each one only arranges the shared blocks.

use crate::models::design::{ResolvedDesign, Rgb};
use crate::models::document::Resume;
use crate::render::blocks::{
    contact_line, photo, resume_sections, text, HeadingStyle, Palette, SectionKind,
};
use crate::render::templates::ResumeTemplate;
use crate::render::tree::{Align, BoxNode, Edges, Node, VisualTree};

const ALL_SECTIONS: [SectionKind; 5] = [
    SectionKind::Summary,
    SectionKind::Experience,
    SectionKind::Education,
    SectionKind::Skills,
    SectionKind::Languages,
];

const MAIN_SECTIONS: [SectionKind; 3] = [
    SectionKind::Summary,
    SectionKind::Experience,
    SectionKind::Education,
];

const SIDE_SECTIONS: [SectionKind; 2] = [SectionKind::Skills, SectionKind::Languages];

pub fn render(resume: &Resume, template: ResumeTemplate) -> VisualTree {
    let d = resume.design.resolve();
    let root = match template {
        ResumeTemplate::Modern => modern(resume, &d),
        ResumeTemplate::Classic => classic(resume, &d),
        ResumeTemplate::Minimal => minimal(resume, &d),
        ResumeTemplate::Sidebar => sidebar(resume, &d),
    };
    VisualTree::new(d.font, root)
}

fn name_and_title(resume: &Resume, d: &ResolvedDesign, p: &Palette, align: Align) -> Vec<Node> {
    let mut nodes = Vec::new();
    let name = resume.personal.full_name.trim();
    if !name.is_empty() {
        nodes.push(text(name, d.name_size_px(), p.text, d).bold().align(align).into());
    }
    let title = resume.personal.job_title.trim();
    if !title.is_empty() {
        nodes.push(text(title, d.heading_size_px(), p.accent, d).align(align).into());
    }
    nodes
}

/// Accent header band over a single content column.
fn modern(resume: &Resume, d: &ResolvedDesign) -> BoxNode {
    let on_accent = Palette::inverted();
    let p = Palette::standard(d);

    let mut identity = BoxNode::column("header-identity")
        .gap(6.0)
        .children(name_and_title(resume, d, &on_accent, Align::Left));
    if let Some(contact) = contact_line(&resume.personal.contact_items(), d, on_accent.muted, Align::Left) {
        identity = identity.child(contact);
    }

    let mut header = BoxNode::row("header")
        .background(d.accent)
        .radius(d.radius_px)
        .padding(Edges::xy(40.0, 32.0))
        .gap(24.0)
        .child(identity);
    if let Some(img) = photo(&resume.personal, 96.0, d, Align::Right) {
        header = header.child(BoxNode::column("header-photo").fraction(0.16).child(img));
    }

    let body = BoxNode::column("body")
        .padding(Edges::xy(40.0, 28.0))
        .gap(20.0)
        .children(resume_sections(&ALL_SECTIONS, resume, d, &p, HeadingStyle::Underlined));

    BoxNode::column("page resume-modern")
        .background(Rgb::WHITE)
        .child(header)
        .child(body)
}

/// Centered ink header, ruled uppercase headings.
fn classic(resume: &Resume, d: &ResolvedDesign) -> BoxNode {
    let p = Palette {
        accent: Rgb::INK,
        ..Palette::standard(d)
    };
    let mut header = BoxNode::column("header")
        .gap(6.0)
        .children(name_and_title(resume, d, &p, Align::Center));
    if let Some(contact) = contact_line(&resume.personal.contact_items(), d, p.muted, Align::Center) {
        header = header.child(contact);
    }

    BoxNode::column("page resume-classic")
        .background(Rgb::WHITE)
        .padding(Edges::xy(56.0, 48.0))
        .gap(22.0)
        .child(header)
        .children(resume_sections(&ALL_SECTIONS, resume, d, &p, HeadingStyle::Ruled))
}

/// Whitespace-heavy layout; accent only on the name.
fn minimal(resume: &Resume, d: &ResolvedDesign) -> BoxNode {
    let p = Palette::standard(d);
    let mut header = BoxNode::column("header").gap(4.0);
    let name = resume.personal.full_name.trim();
    if !name.is_empty() {
        header = header.child(text(name, d.name_size_px(), d.accent, d));
    }
    let title = resume.personal.job_title.trim();
    if !title.is_empty() {
        header = header.child(text(title, d.base_size_px, p.muted, d));
    }
    if let Some(contact) = contact_line(&resume.personal.contact_items(), d, p.muted, Align::Left) {
        header = header.child(contact);
    }

    BoxNode::column("page resume-minimal")
        .background(Rgb::WHITE)
        .padding(Edges::xy(64.0, 64.0))
        .gap(28.0)
        .child(header)
        .children(resume_sections(&ALL_SECTIONS, resume, d, &p, HeadingStyle::Quiet))
}

/// Tinted left column with photo, contact, skills and languages.
fn sidebar(resume: &Resume, d: &ResolvedDesign) -> BoxNode {
    let p = Palette::standard(d);
    let side_palette = Palette {
        text: Rgb::INK,
        muted: Rgb::MUTED,
        accent: d.accent,
    };

    let mut side = BoxNode::column("sidebar")
        .fraction(0.32)
        .background(d.accent.tint(0.88))
        .padding(Edges::xy(24.0, 40.0))
        .gap(18.0);
    if let Some(img) = photo(&resume.personal, 120.0, d, Align::Center) {
        side = side.child(img);
    }
    let contacts = resume.personal.contact_items();
    if !contacts.is_empty() {
        side = side.child(
            BoxNode::column("sidebar-contact").gap(4.0).children(
                contacts
                    .iter()
                    .map(|c| text(*c, d.small_size_px(), side_palette.text, d).into()),
            ),
        );
    }
    side = side.children(resume_sections(
        &SIDE_SECTIONS,
        resume,
        d,
        &side_palette,
        HeadingStyle::Quiet,
    ));

    let main = BoxNode::column("main")
        .padding(Edges::xy(32.0, 40.0))
        .gap(20.0)
        .children(name_and_title(resume, d, &p, Align::Left))
        .children(resume_sections(&MAIN_SECTIONS, resume, d, &p, HeadingStyle::Underlined));

    BoxNode::row("page resume-sidebar")
        .background(Rgb::WHITE)
        .child(side)
        .child(main)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::flow::layout_tree;
    use crate::models::document::{Education, Experience};

    fn sample() -> Resume {
        let mut resume = Resume::default();
        resume.personal.full_name = "Ada Lovelace".into();
        resume.personal.job_title = "Analyst".into();
        resume.personal.email = "ada@example.com".into();
        resume.personal.summary = "Mathematician.".into();
        resume.add_experience(Experience {
            company: "Analytical Engines".into(),
            position: "Programmer".into(),
            start_date: "1842".into(),
            end_date: "1843".into(),
            description: "Wrote the first published algorithm.".into(),
            ..Experience::default()
        });
        resume.add_education(Education {
            institution: "Home tutoring".into(),
            degree: "Mathematics".into(),
            ..Education::default()
        });
        resume.add_skill("Mathematics");
        resume.add_language("French");
        resume
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
    fn test_rendering_is_deterministic() {
        let resume = sample();
        for template in [
            ResumeTemplate::Modern,
            ResumeTemplate::Classic,
            ResumeTemplate::Minimal,
            ResumeTemplate::Sidebar,
        ] {
            assert_eq!(render(&resume, template), render(&resume, template));
        }
    }

    #[test]
    fn test_every_template_shows_the_same_content() {
        let resume = sample();
        let mut reference = all_text(&render(&resume, ResumeTemplate::Classic));
        reference.sort();
        for template in [
            ResumeTemplate::Modern,
            ResumeTemplate::Minimal,
            ResumeTemplate::Sidebar,
        ] {
            // Single contact item, so joined and listed forms coincide.
            let mut other = all_text(&render(&resume, template));
            other.sort();
            assert_eq!(other, reference, "{template:?} differs");
        }
    }

    #[test]
    fn test_trees_are_fixed_width() {
        let resume = sample();
        let tree = render(&resume, ResumeTemplate::Sidebar);
        assert_eq!(tree.width_px, 794.0);
        let layout = layout_tree(&tree);
        assert!(layout.height_px > 100.0);
    }

    #[test]
    fn test_empty_resume_renders_without_sections() {
        let tree = render(&Resume::default(), ResumeTemplate::Classic);
        assert!(all_text(&tree).is_empty());
    }

    #[test]
    fn test_photo_only_when_present() {
        let mut resume = sample();
        let has_image = |tree: &VisualTree| !tree.image_sources().is_empty();
        assert!(!has_image(&render(&resume, ResumeTemplate::Modern)));
        resume.personal.photo_url = Some("https://cdn.example.com/me.jpg".into());
        assert!(has_image(&render(&resume, ResumeTemplate::Modern)));
        assert!(has_image(&render(&resume, ResumeTemplate::Sidebar)));
    }
}
