//! Preview renderer: document + tokens to an on-screen visual tree.
//!
//! The tree mirrors an 8.5in × 11in page and is built from plain data: tags,
//! semantic roles, CSS-like declarations, attributes and text. Hosts either
//! draw it themselves (it serializes with serde) or use [`VisualTree::to_html`].
//! Building it performs no I/O and is deterministic, so two renders of the
//! same input compare equal.

use crate::labels::Labels;
use crate::model::{CanonicalDocument, EducationEntry, EntryId, ExperienceEntry, LanguageEntry};
use crate::photo::{self, PhotoAsset};
use crate::recipe::{HeaderPlan, Recipe, Section, SectionBody};
use crate::templates::{
    Alignment, DividerStyle, HeaderPlacement, HeadingMarker, LanguagesStyle, LayoutShape, Region,
    SectionKind, SidePosition, SkillsStyle, SummaryStyle, TemplateStyle,
};
use log::debug;
use serde::Serialize;
use std::collections::BTreeMap;

/// What a node means, independent of how it is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    Page,
    Header,
    Name,
    Title,
    ContactList,
    ContactItem,
    Separator,
    Avatar,
    Photo,
    Columns,
    Region(Region),
    Section(SectionKind),
    Heading,
    HeadingText,
    HeadingMarker,
    Summary,
    Entry(SectionKind),
    EntryHeader,
    EntryMarker,
    EntryTitle,
    EntryOrganization,
    EntryPeriod,
    EntryDescription,
    SkillList,
    SkillTag,
    LanguageList,
    LanguageName,
    LanguageLevel,
}

/// One element of the visual tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub tag: &'static str,
    pub role: Role,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub style: BTreeMap<&'static str, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<&'static str, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(tag: &'static str, role: Role) -> Self {
        Node {
            tag,
            role,
            style: BTreeMap::new(),
            attrs: BTreeMap::new(),
            text: None,
            children: Vec::new(),
        }
    }

    fn css(mut self, property: &'static str, value: impl Into<String>) -> Self {
        self.style.insert(property, value.into());
        self
    }

    fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attrs.insert(name, value.into());
        self
    }

    fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    fn child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    fn children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    /// First node with `role`, depth first.
    pub fn find_role(&self, role: Role) -> Option<&Node> {
        if self.role == role {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_role(role))
    }

    /// Every node with `role`, in document order.
    pub fn find_all(&self, role: Role) -> Vec<&Node> {
        let mut found = Vec::new();
        self.collect(role, &mut found);
        found
    }

    fn collect<'a>(&'a self, role: Role, found: &mut Vec<&'a Node>) {
        if self.role == role {
            found.push(self);
        }
        for child in &self.children {
            child.collect(role, found);
        }
    }

    /// Concatenated text of this node and its descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.write_text(&mut out);
        out
    }

    fn write_text(&self, out: &mut String) {
        if let Some(text) = &self.text {
            out.push_str(text);
        }
        for child in &self.children {
            child.write_text(out);
        }
    }

    fn write_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(self.tag);
        for (name, value) in &self.attrs {
            out.push_str(&format!(" {}=\"{}\"", name, escape(value)));
        }
        if !self.style.is_empty() {
            let declarations: Vec<String> = self
                .style
                .iter()
                .map(|(k, v)| format!("{}: {}", k, v))
                .collect();
            out.push_str(&format!(" style=\"{}\"", escape(&declarations.join("; "))));
        }
        if self.tag == "img" {
            out.push_str(" />");
            return;
        }
        out.push('>');
        if let Some(text) = &self.text {
            out.push_str(&escape(text));
        }
        for child in &self.children {
            child.write_html(out);
        }
        out.push_str(&format!("</{}>", self.tag));
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// The rendered preview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualTree {
    pub template: &'static str,
    pub root: Node,
}

impl VisualTree {
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.root.write_html(&mut out);
        out
    }

    pub fn to_json(&self) -> String {
        // Only strings and maps with string keys; serialization cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn find_role(&self, role: Role) -> Option<&Node> {
        self.root.find_role(role)
    }

    pub fn find_all(&self, role: Role) -> Vec<&Node> {
        self.root.find_all(role)
    }

    pub fn section(&self, kind: SectionKind) -> Option<&Node> {
        self.find_role(Role::Section(kind))
    }

    pub fn text_content(&self) -> String {
        self.root.text_content()
    }
}

fn pt(value: f32) -> String {
    format!("{}pt", value)
}

fn align(alignment: Alignment) -> &'static str {
    match alignment {
        Alignment::Left => "left",
        Alignment::Center => "center",
    }
}

struct PreviewBuilder<'a> {
    style: &'a TemplateStyle,
    photo: Option<&'a PhotoAsset>,
}

impl PreviewBuilder<'_> {
    fn header(&self, plan: &HeaderPlan<'_>) -> Node {
        let header = &self.style.header;
        let scale = &self.style.scale;
        let mut node = Node::new("header", Role::Header)
            .css("text-align", align(header.alignment))
            .css("margin-bottom", pt(scale.heading * 1.5));
        if let Some(rule) = header.rule {
            node = node
                .css("border-bottom", format!("{} solid {}", pt(rule.width), rule.color))
                .css("padding-bottom", pt(scale.body * 1.5));
        }
        if header.portrait {
            node = node.child(self.portrait(plan.name));
        }
        node = node.child(
            Node::new("h1", Role::Name)
                .css("font-family", header.name_font.css_stack())
                .css("font-size", pt(scale.name))
                .css("font-weight", "bold")
                .css("color", header.name_color.to_string())
                .css("margin", "0")
                .text(header.name_case.apply(plan.name)),
        );
        if let Some(title) = plan.title {
            node = node.child(
                Node::new("p", Role::Title)
                    .css("font-family", header.title_font.css_stack())
                    .css("font-size", pt(scale.title))
                    .css("color", header.title_color.to_string())
                    .css("margin", pt(scale.body * 0.4) + " 0 0 0")
                    .text(header.title_case.apply(title)),
            );
        }
        if !plan.contact.is_empty() {
            let justify = match header.alignment {
                Alignment::Left => "flex-start",
                Alignment::Center => "center",
            };
            let mut list = Node::new("div", Role::ContactList)
                .css("display", "flex")
                .css("flex-wrap", "wrap")
                .css("gap", pt(scale.body * 0.6))
                .css("justify-content", justify)
                .css("font-size", pt(scale.small))
                .css("color", self.style.palette.muted.to_string())
                .css("margin-top", pt(scale.body));
            for (i, item) in plan.contact.iter().enumerate() {
                if i > 0 {
                    list = list.child(
                        Node::new("span", Role::Separator)
                            .attr("aria-hidden", "true")
                            .text(self.style.inline_separator.trim()),
                    );
                }
                list = list.child(Node::new("span", Role::ContactItem).text(*item));
            }
            node = node.child(list);
        }
        node
    }

    fn portrait(&self, name: &str) -> Node {
        let accent = self.style.accent.to_string();
        match self.photo {
            Some(photo) => Node::new("img", Role::Photo)
                .attr("src", photo.data_url())
                .attr("alt", name)
                .css("width", "96pt")
                .css("height", "96pt")
                .css("border-radius", "50%")
                .css("object-fit", "cover")
                .css("border", format!("3pt solid {}", accent))
                .css("display", "block")
                .css("margin", "0 auto 18pt auto"),
            None => Node::new("div", Role::Avatar)
                .attr("aria-hidden", "true")
                .css("width", "72pt")
                .css("height", "72pt")
                .css("border-radius", "50%")
                .css("background", accent)
                .css("color", "rgba(255, 255, 255, 0.5)")
                .css("font-size", "24pt")
                .css("font-weight", "bold")
                .css("display", "flex")
                .css("align-items", "center")
                .css("justify-content", "center")
                .css("margin", "0 auto 18pt auto")
                .text(photo::initial(name)),
        }
    }

    fn heading(&self, label: &str, region: Region) -> Node {
        let style = self.style;
        let on_filled_side = region == Region::Side && style.palette.side_background.is_some();
        let (color, size) = if region == Region::Side {
            (style.palette.side_heading, style.scale.side_heading)
        } else {
            (style.palette.heading, style.scale.heading)
        };
        let mut node = Node::new("h2", Role::Heading)
            .css("font-family", style.heading_font.css_stack())
            .css("font-size", pt(size))
            .css("font-weight", "bold")
            .css("color", color.to_string())
            .css("text-align", align(style.heading_alignment))
            .css("margin", format!("0 0 {} 0", pt(size * 0.6)));
        if style.divider == DividerStyle::Bordered {
            node = node
                .css(
                    "border-bottom",
                    format!("{} solid {}", pt(style.divider_width), style.divider_color),
                )
                .css("padding-bottom", pt(size * 0.3));
        }
        if style.heading_marker == HeadingMarker::AccentDot && !on_filled_side {
            node = node.child(
                Node::new("span", Role::HeadingMarker)
                    .attr("aria-hidden", "true")
                    .css("display", "inline-block")
                    .css("width", "6pt")
                    .css("height", "6pt")
                    .css("border-radius", "50%")
                    .css("background", style.accent.to_string())
                    .css("margin-right", "6pt"),
            );
        }
        node.child(Node::new("span", Role::HeadingText).text(style.heading_case.apply(label)))
    }

    fn section(&self, section: &Section<'_>, region: Region) -> Node {
        let mut node = Node::new("section", Role::Section(section.kind))
            .css("margin-bottom", pt(self.style.scale.heading * 1.6));
        if let Some(label) = &section.heading {
            node = node.child(self.heading(label, region));
        }
        let body = match &section.body {
            SectionBody::Contact(items) => vec![self.contact(items, region)],
            SectionBody::Summary(text) => vec![self.summary(text, region)],
            SectionBody::Experience(entries) => {
                entries.iter().map(|e| self.experience(e, region)).collect()
            }
            SectionBody::Education(entries) => {
                entries.iter().map(|e| self.education(e, region)).collect()
            }
            SectionBody::Skills(skills) => vec![self.skills(skills, region)],
            SectionBody::Languages(entries) => self.languages(entries, region),
        };
        node.children(body)
    }

    fn text_color(&self, region: Region) -> String {
        match region {
            Region::Side => self.style.palette.side_text.to_string(),
            Region::Main => self.style.palette.text.to_string(),
        }
    }

    fn contact(&self, items: &[&str], region: Region) -> Node {
        Node::new("ul", Role::ContactList)
            .css("list-style", "none")
            .css("padding", "0")
            .css("margin", "0")
            .css("font-size", pt(self.style.scale.small))
            .css("color", self.text_color(region))
            .children(items.iter().map(|item| {
                Node::new("li", Role::ContactItem)
                    .css("margin-bottom", "4pt")
                    .text(*item)
            }))
    }

    fn summary(&self, text: &str, region: Region) -> Node {
        let style = self.style;
        let node = Node::new("p", Role::Summary)
            .css("font-size", pt(style.scale.body))
            .css("line-height", "1.5")
            .css("color", self.text_color(region))
            .css("margin", "0");
        match style.summary {
            SummaryStyle::Titled => node.text(text),
            SummaryStyle::Callout => node
                .css("background", "#f8fafc")
                .css("border-left", format!("3pt solid {}", style.accent))
                .css("padding", "10pt")
                .text(text),
            SummaryStyle::Quote => node
                .css("font-style", "italic")
                .css("text-align", "center")
                .text(format!("\u{201c}{}\u{201d}", text)),
        }
    }

    fn keyed(node: Node, id: &Option<EntryId>) -> Node {
        match id {
            Some(id) => node.attr("data-key", id.to_string()),
            None => node,
        }
    }

    fn entry_header(&self, title: &str, period: &str, region: Region) -> Node {
        let style = self.style;
        let title_color = match region {
            Region::Side if style.palette.side_background.is_some() => style.palette.side_text,
            _ => style.palette.heading,
        };
        let mut row = Node::new("div", Role::EntryHeader)
            .css("display", "flex")
            .css("justify-content", "space-between")
            .css("align-items", "baseline");
        if !title.trim().is_empty() {
            row = row.child(
                Node::new("h3", Role::EntryTitle)
                    .css("font-family", style.entry_font.css_stack())
                    .css("font-size", pt(style.scale.entry_title))
                    .css("font-weight", "bold")
                    .css("color", title_color.to_string())
                    .css("margin", "0")
                    .text(title),
            );
        }
        if !period.trim().is_empty() {
            row = row.child(
                Node::new("span", Role::EntryPeriod)
                    .css("font-family", style.detail_font.css_stack())
                    .css("font-size", pt(style.scale.small))
                    .css("color", style.palette.muted.to_string())
                    .text(period),
            );
        }
        row
    }

    fn experience(&self, entry: &ExperienceEntry, region: Region) -> Node {
        let style = self.style;
        let mut node = Node::new("article", Role::Entry(SectionKind::Experience))
            .css("margin-bottom", pt(style.scale.body * 1.4));
        if style.entry_marker {
            node = node
                .css("position", "relative")
                .css("padding-left", "14pt")
                .child(
                    Node::new("span", Role::EntryMarker)
                        .attr("aria-hidden", "true")
                        .css("position", "absolute")
                        .css("left", "0")
                        .css("top", "4pt")
                        .css("width", "7pt")
                        .css("height", "7pt")
                        .css("border-radius", "50%")
                        .css("background", style.accent.to_string()),
                );
        }
        node = node.child(self.entry_header(&entry.role, &entry.period, region));
        if !entry.company.trim().is_empty() {
            let mut company = Node::new("p", Role::EntryOrganization)
                .css("font-size", pt(style.scale.body))
                .css("font-weight", "600")
                .css("margin", "2pt 0 4pt 0")
                .text(entry.company.as_str());
            if style.company_italic {
                company = company.css("font-style", "italic");
            }
            company = company.css(
                "color",
                if style.company_accent {
                    style.accent.to_string()
                } else {
                    self.text_color(region)
                },
            );
            node = node.child(company);
        }
        if !entry.description.trim().is_empty() {
            node = node.child(
                Node::new("p", Role::EntryDescription)
                    .css("font-size", pt(style.scale.body))
                    .css("line-height", "1.5")
                    .css("white-space", "pre-wrap")
                    .css("color", self.text_color(region))
                    .css("margin", "0")
                    .text(entry.description.as_str()),
            );
        }
        Self::keyed(node, &entry.id)
    }

    fn education(&self, entry: &EducationEntry, region: Region) -> Node {
        let style = self.style;
        let mut node = Node::new("article", Role::Entry(SectionKind::Education))
            .css("margin-bottom", pt(style.scale.body))
            .child(self.entry_header(&entry.school, &entry.period, region));
        if !entry.degree.trim().is_empty() {
            let mut degree = Node::new("p", Role::EntryOrganization)
                .css("font-size", pt(style.scale.body))
                .css("color", self.text_color(region))
                .css("margin", "2pt 0 0 0")
                .text(entry.degree.as_str());
            if style.company_italic {
                degree = degree.css("font-style", "italic");
            }
            node = node.child(degree);
        }
        Self::keyed(node, &entry.id)
    }

    fn skills(&self, skills: &[&str], region: Region) -> Node {
        let style = self.style;
        match style.skills {
            SkillsStyle::Tags => {
                let tags = skills.iter().map(|skill| {
                    let mut tag = Node::new("span", Role::SkillTag)
                        .css("font-family", style.detail_font.css_stack())
                        .css("font-size", pt(style.scale.small))
                        .css("color", style.palette.tag_text.to_string())
                        .css("padding", "2pt 6pt")
                        .css("border-radius", "3pt");
                    if let Some(bg) = style.palette.tag_background {
                        tag = tag.css("background", bg.to_string());
                    }
                    if let Some(border) = style.palette.tag_border {
                        tag = tag.css("border", format!("0.75pt solid {}", border));
                    }
                    tag.text(*skill)
                });
                Node::new("div", Role::SkillList)
                    .css("display", "flex")
                    .css("flex-wrap", "wrap")
                    .css("gap", "5pt")
                    .children(tags)
            }
            SkillsStyle::Inline => {
                let mut list = Node::new("p", Role::SkillList)
                    .css("font-size", pt(style.scale.body))
                    .css("color", self.text_color(region))
                    .css("margin", "0");
                for (i, skill) in skills.iter().enumerate() {
                    if i > 0 {
                        list = list.child(Node::new("span", Role::Separator).text(style.inline_separator));
                    }
                    list = list.child(Node::new("span", Role::SkillTag).text(*skill));
                }
                list
            }
        }
    }

    fn languages(&self, entries: &[LanguageEntry], region: Region) -> Vec<Node> {
        let style = self.style;
        match style.languages {
            LanguagesStyle::Stacked => entries
                .iter()
                .map(|entry| {
                    let mut node = Node::new("div", Role::Entry(SectionKind::Languages))
                        .css("margin-bottom", "5pt")
                        .child(
                            Node::new("div", Role::LanguageName)
                                .css("font-family", style.entry_font.css_stack())
                                .css("font-size", pt(style.scale.body))
                                .css("font-weight", "bold")
                                .css("color", self.text_color(region))
                                .text(entry.language.as_str()),
                        );
                    if !entry.level.trim().is_empty() {
                        node = node.child(
                            Node::new("div", Role::LanguageLevel)
                                .css("font-size", pt(style.scale.small))
                                .css("color", style.palette.muted.to_string())
                                .text(entry.level.as_str()),
                        );
                    }
                    Self::keyed(node, &entry.id)
                })
                .collect(),
            LanguagesStyle::Inline => {
                let mut line = Node::new("p", Role::LanguageList)
                    .css("font-size", pt(style.scale.body))
                    .css("color", self.text_color(region))
                    .css("margin", "0");
                for (i, entry) in entries.iter().enumerate() {
                    if i > 0 {
                        line = line.child(Node::new("span", Role::Separator).text(style.inline_separator));
                    }
                    let mut item = Node::new("span", Role::Entry(SectionKind::Languages)).child(
                        Node::new("strong", Role::LanguageName)
                            .css("font-family", style.entry_font.css_stack())
                            .text(entry.language.as_str()),
                    );
                    if !entry.level.trim().is_empty() {
                        item = item.child(
                            Node::new("span", Role::LanguageLevel)
                                .text(format!(" ({})", entry.level.trim())),
                        );
                    }
                    line = line.child(Self::keyed(item, &entry.id));
                }
                vec![line]
            }
        }
    }

    fn region(&self, region: Region, sections: &[Section<'_>], header: Option<Node>) -> Node {
        let style = self.style;
        let mut node = Node::new("div", Role::Region(region)).css("padding", pt(style.padding));
        if region == Region::Side {
            if let Some(bg) = style.palette.side_background {
                node = node
                    .css("background", bg.to_string())
                    .css("color", style.palette.side_text.to_string());
            }
        }
        if let Some(header) = header {
            node = node.child(header);
        }
        node.children(sections.iter().map(|s| self.section(s, region)))
    }

    fn page(&self, recipe: &Recipe<'_>) -> Node {
        let style = self.style;
        let page = Node::new("div", Role::Page)
            .attr("data-template", style.id.as_str())
            .css("width", "8.5in")
            .css("min-height", "11in")
            .css("aspect-ratio", "8.5 / 11")
            .css("box-sizing", "border-box")
            .css("background", "#ffffff")
            .css("font-family", style.primary_font.css_stack())
            .css("color", style.palette.text.to_string());

        let header = self.header(&recipe.header);
        let (top, in_main, in_side) = match style.header.placement {
            HeaderPlacement::Top => (Some(header), None, None),
            HeaderPlacement::Main => (None, Some(header), None),
            HeaderPlacement::Side => (None, None, Some(header)),
        };

        match style.layout {
            LayoutShape::SingleColumn => {
                let mut body = self.region(Region::Main, &recipe.main, in_main);
                if let Some(top) = top {
                    body.children.insert(0, top);
                }
                page.child(body)
            }
            LayoutShape::TwoColumn | LayoutShape::SidebarMain => {
                let main = self
                    .region(Region::Main, &recipe.main, in_main)
                    .css("flex", "1");
                let side = self
                    .region(Region::Side, &recipe.side, in_side)
                    .css("width", format!("{:.4}%", style.side_fraction * 100.0))
                    .css("box-sizing", "border-box");
                let columns = match style.side_position {
                    SidePosition::Left => [side, main],
                    SidePosition::Right => [main, side],
                };
                let row = Node::new("div", Role::Columns)
                    .css("display", "flex")
                    .css("align-items", "stretch")
                    .css("min-height", "inherit")
                    .children(columns);
                match top {
                    Some(top) => {
                        let inset = pt(style.padding);
                        page.child(top.css("margin", format!("{} {} 0 {}", inset, inset, inset)))
                            .child(row)
                    }
                    None => page.child(row),
                }
            }
        }
    }
}

/// Builds the preview tree. `photo` is used only by templates with a portrait
/// slot.
pub fn render(
    doc: &CanonicalDocument,
    style: &TemplateStyle,
    labels: &Labels,
    photo: Option<&PhotoAsset>,
) -> VisualTree {
    if photo.is_some() && !style.header.portrait {
        debug!("Template {} has no portrait slot; photo ignored", style.id);
    }
    let recipe = Recipe::build(doc, style, labels);
    let builder = PreviewBuilder { style, photo };
    VisualTree {
        template: style.id.as_str(),
        root: builder.page(&recipe),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::LabelKey;
    use crate::model::TemplateId;
    use crate::templates::{self, FontToken};

    fn jane() -> CanonicalDocument {
        let mut doc = CanonicalDocument::new("Jane Doe");
        doc.personal_info.title = "Engineer".to_string();
        doc.skills = vec!["Go".to_string()];
        doc
    }

    fn full() -> CanonicalDocument {
        CanonicalDocument::from_json(
            r#"{
                "personalInfo": {
                    "name": "Alex Morgan",
                    "title": "Staff Engineer",
                    "email": "alex@example.com",
                    "phone": "+1 555 0100",
                    "location": "Lisbon",
                    "summary": "Builds <reliable> systems & teams."
                },
                "experience": [
                    {"id": 1, "role": "Lead", "company": "Acme", "period": "2020 - now", "description": "Led things."},
                    {"id": 2, "role": "Engineer", "company": "Initech", "period": "2016 - 2020", "description": ""}
                ],
                "education": [{"id": 1, "school": "MIT", "degree": "BSc", "period": "2012 - 2016"}],
                "skills": ["Rust", "Go", "Rust"],
                "languages": [{"id": 1, "language": "English", "level": "Native"}]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn modern_scenario_has_one_skill_tag_and_no_lists() {
        let tree = render(&jane(), templates::style(TemplateId::Modern), &Labels::new(), None);
        let skills = tree.section(SectionKind::Skills).unwrap();
        let tags = skills.find_all(Role::SkillTag);
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].text.as_deref(), Some("Go"));
        assert!(tree.section(SectionKind::Experience).is_none());
        assert!(tree.section(SectionKind::Education).is_none());
        assert_eq!(tree.find_role(Role::Name).unwrap().text.as_deref(), Some("JANE DOE"));
    }

    #[test]
    fn creative_without_photo_shows_initial() {
        let tree = render(&jane(), templates::style(TemplateId::Creative), &Labels::new(), None);
        let avatar = tree.find_role(Role::Avatar).unwrap();
        assert!(avatar.text_content().contains('J'));
        assert!(tree.find_role(Role::Photo).is_none());
    }

    #[test]
    fn creative_with_photo_embeds_data_url() {
        let png = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];
        let photo = PhotoAsset::from_bytes(png).unwrap();
        let tree = render(&jane(), templates::style(TemplateId::Creative), &Labels::new(), Some(&photo));
        let img = tree.find_role(Role::Photo).unwrap();
        assert!(img.attrs["src"].starts_with("data:image/png;base64,"));
        assert!(tree.find_role(Role::Avatar).is_none());

        // Templates without a portrait slot ignore the photo.
        let tree = render(&jane(), templates::style(TemplateId::Classic), &Labels::new(), Some(&photo));
        assert!(tree.find_role(Role::Photo).is_none());
        assert!(tree.find_role(Role::Avatar).is_none());
    }

    #[test]
    fn render_is_idempotent() {
        let doc = full();
        for style in templates::all() {
            let a = render(&doc, style, &Labels::new(), None);
            let b = render(&doc, style, &Labels::new(), None);
            assert_eq!(a, b, "{}", style.id);
            assert_eq!(a.to_html(), b.to_html());
        }
    }

    #[test]
    fn entries_keep_order_and_keys() {
        let tree = render(&full(), templates::style(TemplateId::Technical), &Labels::new(), None);
        let entries = tree.find_all(Role::Entry(SectionKind::Experience));
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].attrs["data-key"], "1");
        assert!(entries[0].text_content().contains("Lead"));
        assert!(entries[1].text_content().contains("Initech"));
        assert!(entries[1].find_role(Role::EntryDescription).is_none());
        // Duplicated skills are shown as given.
        assert_eq!(tree.find_all(Role::SkillTag).len(), 3);
    }

    #[test]
    fn labels_and_heading_case_are_applied() {
        let labels = Labels::new().with(LabelKey::Education, "Formation");
        let tree = render(&full(), templates::style(TemplateId::Classic), &labels, None);
        let heading = tree
            .section(SectionKind::Education)
            .and_then(|s| s.find_role(Role::HeadingText))
            .unwrap();
        assert_eq!(heading.text.as_deref(), Some("FORMATION"));
        let exp = tree
            .section(SectionKind::Experience)
            .and_then(|s| s.find_role(Role::HeadingText))
            .unwrap();
        assert_eq!(exp.text.as_deref(), Some("PROFESSIONAL EXPERIENCE"));
    }

    #[test]
    fn executive_quotes_the_summary() {
        let tree = render(&full(), templates::style(TemplateId::Executive), &Labels::new(), None);
        let summary = tree.find_role(Role::Summary).unwrap();
        assert_eq!(
            summary.text.as_deref(),
            Some("\u{201c}Builds <reliable> systems & teams.\u{201d}")
        );
        assert!(tree.section(SectionKind::Summary).unwrap().find_role(Role::Heading).is_none());
    }

    #[test]
    fn html_is_escaped() {
        let tree = render(&full(), templates::style(TemplateId::Modern), &Labels::new(), None);
        let html = tree.to_html();
        assert!(html.starts_with("<div data-template=\"modern\""));
        assert!(html.contains("Builds &lt;reliable&gt; systems &amp; teams."));
        assert!(!html.contains("<reliable>"));
        assert!(html.contains("aspect-ratio: 8.5 / 11"));
    }

    #[test]
    fn json_uses_roles() {
        let tree = render(&jane(), templates::style(TemplateId::Modern), &Labels::new(), None);
        let json: serde_json::Value = serde_json::from_str(&tree.to_json()).unwrap();
        assert_eq!(json["template"], "modern");
        assert_eq!(json["root"]["role"], "page");
        assert!(tree.to_json().contains("\"skillTag\""));
    }

    #[test]
    fn name_only_document_renders_everywhere() {
        let doc = CanonicalDocument::new("Solo");
        for style in templates::all() {
            let tree = render(&doc, style, &Labels::new(), None);
            assert!(tree.find_all(Role::Heading).is_empty(), "{}", style.id);
            assert!(tree.find_role(Role::Title).is_none());
            assert!(tree.find_role(Role::ContactList).is_none());
        }
    }

    #[test]
    fn executive_entry_titles_use_serif() {
        let tree = render(&full(), templates::style(TemplateId::Executive), &Labels::new(), None);
        let serif = FontToken::Serif.css_stack();
        for node in tree.find_all(Role::EntryTitle) {
            assert_eq!(node.style.get("font-family").map(String::as_str), Some(serif));
        }
        let language = tree.find_role(Role::LanguageName).unwrap();
        assert_eq!(language.style.get("font-family").map(String::as_str), Some(serif));
        let period = tree.find_role(Role::EntryPeriod).unwrap();
        assert_eq!(
            period.style.get("font-family").map(String::as_str),
            Some(FontToken::Sans.css_stack())
        );
    }
}
