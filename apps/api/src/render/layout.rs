//! Section mapping — the renderer contract.
//!
//! Fixed order: header/contact, links, summary, skills, experience, projects,
//! education, activities, volunteering, certificates. A section exists only when
//! its field is present and non-empty; entries keep document order.

use crate::models::resume::{Link, ResumeContent};

pub const PRESENT: &str = "Present";
const SEPARATOR: &str = "  •  ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Header,
    Links,
    Summary,
    Skills,
    Experience,
    Projects,
    Education,
    Activities,
    Volunteering,
    Certificates,
}

impl SectionKind {
    /// Printed heading. Header and links are untitled.
    pub fn heading(self) -> Option<&'static str> {
        match self {
            SectionKind::Header | SectionKind::Links => None,
            SectionKind::Summary => Some("SUMMARY"),
            SectionKind::Skills => Some("SKILLS"),
            SectionKind::Experience => Some("PROFESSIONAL EXPERIENCE"),
            SectionKind::Projects => Some("PROJECTS"),
            SectionKind::Education => Some("EDUCATION"),
            SectionKind::Activities => Some("ACTIVITIES"),
            SectionKind::Volunteering => Some("VOLUNTEERING"),
            SectionKind::Certificates => Some("CERTIFICATES"),
        }
    }

    pub fn is_centered(self) -> bool {
        matches!(self, SectionKind::Header | SectionKind::Links)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    Name,
    Headline,
    Contact,
    Body,
    Meta,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSpan {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Text {
        text: String,
        style: TextStyle,
    },
    Bullets {
        items: Vec<String>,
    },
    /// Two columns: title (and subtitle) on the left, date (and note) on the right.
    Row {
        title: String,
        subtitle: Option<String>,
        date: String,
        note: Option<String>,
    },
    Links {
        links: Vec<LinkSpan>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub kind: SectionKind,
    pub blocks: Vec<Block>,
}

fn text(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn items<T>(value: &Option<Vec<T>>) -> Option<&[T]> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn join_present<'a>(parts: impl IntoIterator<Item = Option<&'a str>>, sep: &str) -> Option<String> {
    let parts: Vec<&str> = parts.into_iter().flatten().collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(sep))
    }
}

/// `start – end`, with the ongoing flag taking precedence over any end date.
pub fn date_range(start: &str, end: Option<&str>, ongoing: Option<bool>) -> String {
    let end = if ongoing == Some(true) {
        Some(PRESENT)
    } else {
        end.map(str::trim).filter(|e| !e.is_empty())
    };
    match (start.trim(), end) {
        ("", None) => String::new(),
        (start, None) => start.to_string(),
        ("", Some(end)) => end.to_string(),
        (start, Some(end)) => format!("{start} – {end}"),
    }
}

fn strip_bullet(line: &str) -> Option<&str> {
    ["- ", "* ", "• "]
        .iter()
        .find_map(|marker| line.strip_prefix(marker))
        .map(str::trim)
}

/// A description whose every line carries a bullet marker becomes a list;
/// anything else is one paragraph.
fn description_blocks(description: &Option<String>) -> Vec<Block> {
    let Some(description) = text(description) else {
        return vec![];
    };
    let lines: Vec<&str> = description
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    let bullets: Vec<String> = lines
        .iter()
        .filter_map(|l| strip_bullet(l))
        .map(String::from)
        .collect();

    if !bullets.is_empty() && bullets.len() == lines.len() {
        vec![Block::Bullets { items: bullets }]
    } else {
        vec![Block::Text {
            text: description.to_string(),
            style: TextStyle::Body,
        }]
    }
}

fn link_block(links: &Option<Vec<Link>>) -> Option<Block> {
    items(links).map(|links| Block::Links {
        links: links
            .iter()
            .map(|l| LinkSpan {
                label: l.kind.clone(),
                url: l.url.clone(),
            })
            .collect(),
    })
}

fn header_section(content: &ResumeContent) -> Option<Section> {
    let mut blocks = Vec::new();
    if let Some(name) = text(&content.full_name) {
        blocks.push(Block::Text {
            text: name.to_uppercase(),
            style: TextStyle::Name,
        });
    }
    if let Some(title) = text(&content.title) {
        blocks.push(Block::Text {
            text: title.to_string(),
            style: TextStyle::Headline,
        });
    }
    let contact = join_present(
        [
            text(&content.email),
            text(&content.phone),
            text(&content.location),
        ],
        SEPARATOR,
    );
    if let Some(contact) = contact {
        blocks.push(Block::Text {
            text: contact,
            style: TextStyle::Contact,
        });
    }
    (!blocks.is_empty()).then_some(Section {
        kind: SectionKind::Header,
        blocks,
    })
}

fn section(kind: SectionKind, blocks: Vec<Block>) -> Option<Section> {
    (!blocks.is_empty()).then_some(Section { kind, blocks })
}

/// Maps a CV into its printable sections.
pub fn layout_document(content: &ResumeContent) -> Vec<Section> {
    let mut sections = Vec::new();

    sections.extend(header_section(content));

    sections.extend(
        link_block(&content.links).and_then(|b| section(SectionKind::Links, vec![b])),
    );

    sections.extend(
        text(&content.summary)
            .and_then(|_| section(SectionKind::Summary, description_blocks(&content.summary))),
    );

    if let Some(skills) = items(&content.skills) {
        sections.extend(section(
            SectionKind::Skills,
            vec![Block::Text {
                text: skills.join(SEPARATOR),
                style: TextStyle::Body,
            }],
        ));
    }

    if let Some(experiences) = items(&content.experiences) {
        let mut blocks = Vec::new();
        for exp in experiences {
            blocks.push(Block::Row {
                title: exp.job_title.clone(),
                subtitle: join_present(
                    [Some(exp.company_name.trim()).filter(|c| !c.is_empty()), text(&exp.location)],
                    " | ",
                ),
                date: date_range(&exp.start_date, exp.end_date.as_deref(), exp.currently_working),
                note: text(&exp.employment_type).map(String::from),
            });
            blocks.extend(link_block(&exp.links));
            blocks.extend(description_blocks(&exp.description));
        }
        sections.extend(section(SectionKind::Experience, blocks));
    }

    if let Some(projects) = items(&content.projects) {
        let mut blocks = Vec::new();
        for project in projects {
            blocks.push(Block::Row {
                title: project.title.clone(),
                subtitle: None,
                date: date_range(
                    &project.start_date,
                    project.end_date.as_deref(),
                    project.currently_ongoing,
                ),
                note: None,
            });
            blocks.extend(description_blocks(&project.description));
            blocks.extend(link_block(&project.links));
            if let Some(technologies) = items(&project.technologies) {
                blocks.push(Block::Text {
                    text: format!("Technologies: {}", technologies.join(", ")),
                    style: TextStyle::Meta,
                });
            }
        }
        sections.extend(section(SectionKind::Projects, blocks));
    }

    if let Some(education) = items(&content.education) {
        let mut blocks = Vec::new();
        for edu in education {
            let school = Some(edu.school_name.trim()).filter(|s| !s.is_empty());
            let degree = match (text(&edu.degree), text(&edu.field_of_study)) {
                (Some(degree), Some(field)) => Some(format!("{degree} in {field}")),
                (Some(single), None) | (None, Some(single)) => Some(single.to_string()),
                (None, None) => None,
            };
            let (title, subtitle) = match degree {
                Some(degree) => (degree, join_present([school, text(&edu.location)], " | ")),
                None => (
                    edu.school_name.clone(),
                    text(&edu.location).map(String::from),
                ),
            };
            blocks.push(Block::Row {
                title,
                subtitle,
                date: date_range(&edu.start_date, edu.end_date.as_deref(), edu.currently_studying),
                note: None,
            });
            if let Some(grade) = text(&edu.grade) {
                blocks.push(Block::Text {
                    text: format!("Grade: {grade}"),
                    style: TextStyle::Meta,
                });
            }
            blocks.extend(description_blocks(&edu.description));
        }
        sections.extend(section(SectionKind::Education, blocks));
    }

    if let Some(activities) = items(&content.activities) {
        let mut blocks = Vec::new();
        for activity in activities {
            blocks.push(Block::Row {
                title: activity.title.clone(),
                subtitle: text(&activity.role).map(String::from),
                date: date_range(
                    &activity.start_date,
                    activity.end_date.as_deref(),
                    activity.currently_ongoing,
                ),
                note: None,
            });
            blocks.extend(description_blocks(&activity.description));
        }
        sections.extend(section(SectionKind::Activities, blocks));
    }

    if let Some(volunteering) = items(&content.volunteering) {
        let mut blocks = Vec::new();
        for vol in volunteering {
            blocks.push(Block::Row {
                title: vol.role.clone(),
                subtitle: join_present(
                    [
                        Some(vol.organization_name.trim()).filter(|o| !o.is_empty()),
                        text(&vol.location),
                    ],
                    " | ",
                ),
                date: date_range(
                    &vol.start_date,
                    vol.end_date.as_deref(),
                    vol.currently_volunteering,
                ),
                note: None,
            });
            blocks.extend(description_blocks(&vol.description));
        }
        sections.extend(section(SectionKind::Volunteering, blocks));
    }

    if let Some(certificates) = items(&content.certificates) {
        let mut blocks = Vec::new();
        for cert in certificates {
            blocks.push(Block::Row {
                title: cert.name.clone(),
                subtitle: text(&cert.issuer).map(String::from),
                date: date_range(cert.issued_on(), cert.end_date.as_deref(), cert.currently_valid),
                note: None,
            });
            if let Some(url) = text(&cert.url) {
                blocks.push(Block::Links {
                    links: vec![LinkSpan {
                        label: "Credential".to_string(),
                        url: url.to_string(),
                    }],
                });
            }
            blocks.extend(description_blocks(cert.details()));
        }
        sections.extend(section(SectionKind::Certificates, blocks));
    }

    sections
}
