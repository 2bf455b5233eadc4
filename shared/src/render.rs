//! HTML rendering of stored events.
//!
//! Three fixed layouts share the same section builders. Every piece of
//! user-supplied text goes through [`escape_html`]; URLs additionally have to
//! pass [`safe_url`] or they are left out of the page.

use chrono::NaiveDate;

use crate::models::{AgendaItem, EventRecord, GalleryItem, Speaker, Sponsor, Template};

const DATE_PLACEHOLDER: &str = "Date to be announced";
const VENUE_PLACEHOLDER: &str = "Venue to be announced";

/// Escape the five HTML special characters.
pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// An `http(s)` URL escaped for use in an attribute, or `None`.
pub fn safe_url(url: &str) -> Option<String> {
    let url = url.trim();
    let lower = url.to_ascii_lowercase();
    let allowed = (lower.starts_with("https://") || lower.starts_with("http://"))
        && !url.chars().any(|c| c.is_whitespace() || c.is_control());
    allowed.then(|| escape_html(url))
}

/// Embed URL for a YouTube or Vimeo link.
pub fn video_embed_url(url: &str) -> Option<String> {
    let url = url.trim();
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))?;
    let rest = rest
        .strip_prefix("www.")
        .or_else(|| rest.strip_prefix("m."))
        .unwrap_or(rest);
    let (host, path) = rest.split_once('/').unwrap_or((rest, ""));

    let is_id = |id: &str| {
        !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    };

    match host {
        "youtube.com" => {
            let id = if let Some(embedded) = path.strip_prefix("embed/") {
                embedded.split(['?', '&', '/']).next()
            } else {
                path.split_once('?').and_then(|(_, query)| {
                    query.split('&').find_map(|pair| pair.strip_prefix("v="))
                })
            }?;
            is_id(id).then(|| format!("https://www.youtube.com/embed/{}", id))
        }
        "youtu.be" => {
            let id = path.split(['?', '&', '/']).next()?;
            is_id(id).then(|| format!("https://www.youtube.com/embed/{}", id))
        }
        "vimeo.com" => {
            let id = path.split(['?', '/']).next()?;
            (!id.is_empty() && id.chars().all(|c| c.is_ascii_digit()))
                .then(|| format!("https://player.vimeo.com/video/{}", id))
        }
        "player.vimeo.com" => path
            .strip_prefix("video/")
            .and_then(|p| p.split(['?', '/']).next())
            .filter(|id| !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()))
            .map(|id| format!("https://player.vimeo.com/video/{}", id)),
        _ => None,
    }
}

/// Human-readable date, falling back to the raw value or a placeholder.
pub fn display_date(date: &str) -> String {
    match NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d") {
        Ok(parsed) => parsed.format("%A, %B %-d, %Y").to_string(),
        Err(_) if date.trim().is_empty() => DATE_PLACEHOLDER.to_string(),
        Err(_) => escape_html(date.trim()),
    }
}

fn or_placeholder(value: &str, placeholder: &str) -> String {
    if value.trim().is_empty() {
        placeholder.to_string()
    } else {
        escape_html(value.trim())
    }
}

fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|part| part.chars().next())
        .take(2)
        .collect::<String>()
        .to_uppercase()
}

/// Render an event with the given layout.
pub fn render_page(record: &EventRecord, template: Template) -> String {
    let body = match template {
        Template::Classic => classic_body(record),
        Template::Modern => modern_body(record),
        Template::Minimal => minimal_body(record),
    };

    let description = escape_html(
        &record
            .description
            .chars()
            .take(160)
            .collect::<String>(),
    );
    let og_image = safe_url(&record.hero_image)
        .map(|url| format!(r#"<meta property="og:image" content="{}">"#, url))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<meta name="description" content="{description}">
<meta property="og:title" content="{title}">
{og_image}
<style>{base_css}{theme_css}</style>
</head>
<body class="template-{selector}">
{body}
</body>
</html>
"#,
        title = escape_html(&record.event_name),
        description = description,
        og_image = og_image,
        base_css = BASE_CSS,
        theme_css = theme_css(template),
        selector = template.selector(),
        body = body,
    )
}

fn classic_body(record: &EventRecord) -> String {
    let hero_style = safe_url(&record.hero_image)
        .map(|url| format!(r#" style="background-image: url('{}')""#, url))
        .unwrap_or_default();

    let mut html = format!(
        r#"<header class="hero"{hero_style}>
<div class="hero-overlay">
{logo}<h1>{name}</h1>
<p class="meta">{date}{time}</p>
<p class="meta">{venue}</p>
{register}
</div>
</header>
<main>
"#,
        hero_style = hero_style,
        logo = logo_html(record),
        name = escape_html(&record.event_name),
        date = display_date(&record.event_date),
        time = time_suffix(record),
        venue = or_placeholder(&record.venue, VENUE_PLACEHOLDER),
        register = register_button(record),
    );

    html.push_str(&common_sections(record));
    html.push_str("</main>\n");
    html.push_str(&footer(record));
    html
}

fn modern_body(record: &EventRecord) -> String {
    let visual = match safe_url(&record.hero_image) {
        Some(url) => format!(
            r#"<div class="split-visual"><img src="{}" alt="{}"></div>"#,
            url,
            escape_html(&record.event_name)
        ),
        None => r#"<div class="split-visual placeholder"></div>"#.to_string(),
    };

    let mut html = format!(
        r#"<header class="split">
<div class="split-text">
{logo}<span class="eyebrow">{date}{time}</span>
<h1>{name}</h1>
<p class="venue">{venue}</p>
{register}
</div>
{visual}
</header>
<main>
"#,
        logo = logo_html(record),
        date = display_date(&record.event_date),
        time = time_suffix(record),
        name = escape_html(&record.event_name),
        venue = or_placeholder(&record.venue, VENUE_PLACEHOLDER),
        register = register_button(record),
        visual = visual,
    );

    html.push_str(&common_sections(record));
    html.push_str("</main>\n");
    html.push_str(&footer(record));
    html
}

fn minimal_body(record: &EventRecord) -> String {
    let mut html = format!(
        r#"<main class="narrow">
<h1>{name}</h1>
<p class="meta">{date}{time} &middot; {venue}</p>
{register}
"#,
        name = escape_html(&record.event_name),
        date = display_date(&record.event_date),
        time = time_suffix(record),
        venue = or_placeholder(&record.venue, VENUE_PLACEHOLDER),
        register = register_button(record),
    );

    html.push_str(&common_sections(record));
    html.push_str("</main>\n");
    html.push_str(&footer(record));
    html
}

fn time_suffix(record: &EventRecord) -> String {
    if record.event_time.trim().is_empty() {
        String::new()
    } else {
        format!(" &middot; {}", escape_html(record.event_time.trim()))
    }
}

fn logo_html(record: &EventRecord) -> String {
    safe_url(&record.logo)
        .map(|url| {
            format!(
                r#"<img class="logo" src="{}" alt="{} logo">
"#,
                url,
                escape_html(&record.event_name)
            )
        })
        .unwrap_or_default()
}

fn register_button(record: &EventRecord) -> String {
    safe_url(&record.registration_url)
        .map(|url| {
            format!(
                r#"<a class="button" href="{}" target="_blank" rel="noopener">Register</a>"#,
                url
            )
        })
        .unwrap_or_default()
}

fn common_sections(record: &EventRecord) -> String {
    [
        about_section(record),
        video_section(record),
        agenda_section(&record.agenda),
        speakers_section(&record.speakers),
        sponsors_section(&record.sponsors),
        gallery_section(&record.gallery),
    ]
    .concat()
}

fn about_section(record: &EventRecord) -> String {
    if record.description.trim().is_empty() {
        return String::new();
    }
    let paragraphs: String = record
        .description
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| format!("<p>{}</p>\n", escape_html(p).replace('\n', "<br>")))
        .collect();
    format!(
        "<section class=\"about\">\n<h2>About</h2>\n{}</section>\n",
        paragraphs
    )
}

fn video_section(record: &EventRecord) -> String {
    match video_embed_url(&record.video_url) {
        Some(src) => format!(
            r#"<section class="video">
<div class="video-frame"><iframe src="{}" title="Event video" allowfullscreen loading="lazy"></iframe></div>
</section>
"#,
            escape_html(&src)
        ),
        None => String::new(),
    }
}

fn agenda_section(agenda: &[AgendaItem]) -> String {
    if agenda.is_empty() {
        return String::new();
    }
    let rows: String = agenda
        .iter()
        .map(|item| {
            let speaker = if item.speaker.is_empty() {
                String::new()
            } else {
                format!(r#"<span class="agenda-speaker">{}</span>"#, escape_html(&item.speaker))
            };
            let description = if item.description.is_empty() {
                String::new()
            } else {
                format!("<p>{}</p>", escape_html(&item.description))
            };
            format!(
                "<li><span class=\"agenda-time\">{}</span><div><strong>{}</strong>{}{}</div></li>\n",
                escape_html(&item.time),
                escape_html(&item.title),
                speaker,
                description
            )
        })
        .collect();
    format!(
        "<section class=\"agenda\">\n<h2>Agenda</h2>\n<ol>\n{}</ol>\n</section>\n",
        rows
    )
}

fn speakers_section(speakers: &[Speaker]) -> String {
    if speakers.is_empty() {
        return String::new();
    }
    let cards: String = speakers
        .iter()
        .map(|speaker| {
            let photo = match safe_url(&speaker.photo) {
                Some(url) => format!(
                    r#"<img src="{}" alt="{}" loading="lazy">"#,
                    url,
                    escape_html(&speaker.name)
                ),
                None => format!(
                    r#"<div class="avatar">{}</div>"#,
                    escape_html(&initials(&speaker.name))
                ),
            };
            let bio = if speaker.bio.is_empty() {
                String::new()
            } else {
                format!("<p class=\"bio\">{}</p>", escape_html(&speaker.bio))
            };
            format!(
                "<div class=\"speaker\">{}<h3>{}</h3><p class=\"role\">{}</p>{}</div>\n",
                photo,
                escape_html(&speaker.name),
                escape_html(&speaker.role),
                bio
            )
        })
        .collect();
    format!(
        "<section class=\"speakers\">\n<h2>Speakers</h2>\n<div class=\"grid\">\n{}</div>\n</section>\n",
        cards
    )
}

fn sponsors_section(sponsors: &[Sponsor]) -> String {
    if sponsors.is_empty() {
        return String::new();
    }
    let items: String = sponsors
        .iter()
        .map(|sponsor| {
            let mark = match safe_url(&sponsor.logo) {
                Some(url) => {
                    format!(r#"<img src="{}" alt="{}">"#, url, escape_html(&sponsor.name))
                }
                None => format!(
                    "<span class=\"sponsor-name\">{}</span>",
                    escape_html(&sponsor.name)
                ),
            };
            let mark = match safe_url(&sponsor.website) {
                Some(url) => format!(
                    r#"<a href="{}" target="_blank" rel="noopener">{}</a>"#,
                    url, mark
                ),
                None => mark,
            };
            let tier = if sponsor.tier.is_empty() {
                String::new()
            } else {
                format!("<span class=\"tier\">{}</span>", escape_html(&sponsor.tier))
            };
            format!("<div class=\"sponsor\">{}{}</div>\n", mark, tier)
        })
        .collect();
    format!(
        "<section class=\"sponsors\">\n<h2>Sponsors</h2>\n<div class=\"sponsor-row\">\n{}</div>\n</section>\n",
        items
    )
}

fn gallery_section(gallery: &[GalleryItem]) -> String {
    let figures: String = gallery
        .iter()
        .filter_map(|item| {
            safe_url(&item.url).map(|url| {
                let caption = if item.caption.is_empty() {
                    String::new()
                } else {
                    format!("<figcaption>{}</figcaption>", escape_html(&item.caption))
                };
                format!(
                    "<figure><img src=\"{}\" alt=\"{}\" loading=\"lazy\">{}</figure>\n",
                    url,
                    escape_html(&item.caption),
                    caption
                )
            })
        })
        .collect();
    if figures.is_empty() {
        return String::new();
    }
    format!(
        "<section class=\"gallery\">\n<h2>Gallery</h2>\n<div class=\"grid\">\n{}</div>\n</section>\n",
        figures
    )
}

fn footer(record: &EventRecord) -> String {
    let organizer = if record.organizer.is_empty() {
        String::new()
    } else {
        format!("<p>Organized by {}</p>", escape_html(&record.organizer))
    };
    let contact = if record.contact_email.is_empty() {
        String::new()
    } else {
        let email = escape_html(&record.contact_email);
        format!(r#"<p>Contact: <a href="mailto:{0}">{0}</a></p>"#, email)
    };
    format!("<footer>\n{}{}\n</footer>\n", organizer, contact)
}

fn theme_css(template: Template) -> &'static str {
    match template {
        Template::Classic => CLASSIC_CSS,
        Template::Modern => MODERN_CSS,
        Template::Minimal => MINIMAL_CSS,
    }
}

const BASE_CSS: &str = "*{box-sizing:border-box}body{margin:0;font-family:system-ui,-apple-system,'Segoe UI',sans-serif;line-height:1.6}\
main{max-width:960px;margin:0 auto;padding:2rem 1rem}section{margin:2.5rem 0}h2{margin-bottom:1rem}\
.button{display:inline-block;padding:.75rem 1.5rem;border-radius:6px;text-decoration:none;font-weight:600}\
.grid{display:grid;grid-template-columns:repeat(auto-fill,minmax(200px,1fr));gap:1.5rem}\
.speaker img,.avatar{width:120px;height:120px;border-radius:50%;object-fit:cover}\
.avatar{display:flex;align-items:center;justify-content:center;font-size:2rem;font-weight:700}\
.agenda ol{list-style:none;padding:0}.agenda li{display:flex;gap:1rem;padding:.75rem 0;border-bottom:1px solid rgba(127,127,127,.25)}\
.agenda-time{min-width:5rem;font-variant-numeric:tabular-nums}.agenda-speaker{display:block;opacity:.75}\
.sponsor-row{display:flex;flex-wrap:wrap;gap:2rem;align-items:center}.sponsor img{max-height:60px}.tier{display:block;font-size:.8rem;text-transform:uppercase;opacity:.7}\
.gallery img{width:100%;border-radius:6px}.video-frame{position:relative;padding-top:56.25%}\
.video-frame iframe{position:absolute;inset:0;width:100%;height:100%;border:0}.logo{max-height:80px}\
footer{text-align:center;padding:2rem 1rem;font-size:.9rem}";

const CLASSIC_CSS: &str = ".hero{background:#1f2937 center/cover no-repeat;color:#fff;text-align:center}\
.hero-overlay{background:rgba(0,0,0,.55);padding:6rem 1rem}.hero h1{font-size:3rem;margin:.5rem 0}\
.button{background:#f59e0b;color:#111}.avatar{background:#e5e7eb;color:#374151}footer{background:#f3f4f6}";

const MODERN_CSS: &str = "body{background:#0f172a;color:#e2e8f0}a{color:#38bdf8}\
.split{display:grid;grid-template-columns:1fr 1fr;min-height:70vh}.split-text{padding:4rem 3rem;display:flex;flex-direction:column;justify-content:center}\
.split-visual img{width:100%;height:100%;object-fit:cover}.split-visual.placeholder{background:linear-gradient(135deg,#6366f1,#0ea5e9)}\
.eyebrow{text-transform:uppercase;letter-spacing:.15em;color:#38bdf8}.split h1{font-size:3.5rem;margin:.5rem 0}\
.button{background:#38bdf8;color:#0f172a;align-self:flex-start}.avatar{background:#1e293b}\
@media(max-width:768px){.split{grid-template-columns:1fr}}";

const MINIMAL_CSS: &str = "body{font-family:Georgia,'Times New Roman',serif;color:#111}.narrow{max-width:680px}\
.narrow h1{font-size:2.75rem;font-weight:400;margin-bottom:.25rem}.meta{color:#555}\
.button{border:1px solid #111;color:#111}.avatar{border:1px solid #ccc}";
