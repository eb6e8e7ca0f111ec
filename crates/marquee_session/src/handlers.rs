//! Transition handlers.
//!
//! Each handler validates before it mutates: a `Stay` leaves the session
//! untouched.

use crate::{Event, FlowOptions, Prompt, Session, StateTag, Step};
use marquee_core::{
    LinkEntry, PosterSource, is_http_url, is_skip, parse_genres, parse_rating, parse_year,
};

fn text(event: &Event) -> Option<&str> {
    match event {
        Event::Text(text) => Some(text.trim()),
        _ => None,
    }
}

fn yes_no(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "yes" | "y" => Some(true),
        "no" | "n" => Some(false),
        _ => None,
    }
}

pub(crate) fn manual_title(session: &mut Session, event: &Event, _: &FlowOptions) -> Step {
    match text(event) {
        Some(title) if !title.is_empty() => {
            session.record_mut().set_title(title);
            Step::Advance(StateTag::ManualWaitYear, Prompt::AskYear)
        }
        _ => Step::Stay(Prompt::AskTitle),
    }
}

pub(crate) fn manual_year(session: &mut Session, event: &Event, _: &FlowOptions) -> Step {
    match text(event).and_then(parse_year) {
        Some(year) => {
            session.record_mut().year = Some(year);
            Step::Advance(StateTag::ManualWaitOverview, Prompt::AskOverview)
        }
        None => Step::Stay(Prompt::InvalidYear),
    }
}

pub(crate) fn manual_overview(session: &mut Session, event: &Event, _: &FlowOptions) -> Step {
    let Some(overview) = text(event) else {
        return Step::Stay(Prompt::AskOverview);
    };
    session.record_mut().overview = if is_skip(overview) {
        String::new()
    } else {
        overview.to_string()
    };
    Step::Advance(StateTag::ManualWaitGenres, Prompt::AskGenres)
}

pub(crate) fn manual_genres(session: &mut Session, event: &Event, _: &FlowOptions) -> Step {
    let Some(genres) = text(event) else {
        return Step::Stay(Prompt::AskGenres);
    };
    session.record_mut().genres = if is_skip(genres) {
        Vec::new()
    } else {
        parse_genres(genres)
    };
    Step::Advance(StateTag::ManualWaitRating, Prompt::AskRating)
}

pub(crate) fn manual_rating(session: &mut Session, event: &Event, _: &FlowOptions) -> Step {
    match text(event).and_then(parse_rating) {
        Some(rating) => {
            session.record_mut().rating = rating.into_option();
            Step::Advance(StateTag::ManualWaitPoster, Prompt::AskPoster)
        }
        None => Step::Stay(Prompt::InvalidRating),
    }
}

pub(crate) fn manual_poster_text(session: &mut Session, event: &Event, _: &FlowOptions) -> Step {
    let poster = match text(event) {
        Some(value) if is_skip(value) => PosterSource::None,
        Some(value) if is_http_url(value) => PosterSource::Remote(value.to_string()),
        _ => return Step::Stay(Prompt::InvalidPoster),
    };
    session.record_mut().poster = poster;
    Step::Advance(StateTag::AwaitingLanguage, Prompt::AskLanguage)
}

pub(crate) fn manual_poster_photo(session: &mut Session, event: &Event, _: &FlowOptions) -> Step {
    match event {
        Event::Photo(bytes) if !bytes.is_empty() => {
            session.record_mut().poster = PosterSource::Uploaded(bytes.clone());
            Step::Advance(StateTag::AwaitingLanguage, Prompt::AskLanguage)
        }
        _ => Step::Stay(Prompt::InvalidPoster),
    }
}

pub(crate) fn language(session: &mut Session, event: &Event, options: &FlowOptions) -> Step {
    match text(event) {
        Some(language) if !language.is_empty() => {
            session.record_mut().language = Some(language.to_string());
            if *options.ask_quality() {
                Step::Advance(StateTag::AwaitingQuality, Prompt::AskQuality)
            } else {
                Step::Advance(StateTag::AskLinks, Prompt::AskLinks)
            }
        }
        _ => Step::Stay(Prompt::AskLanguage),
    }
}

pub(crate) fn quality(session: &mut Session, event: &Event, _: &FlowOptions) -> Step {
    match text(event) {
        Some(quality) if !quality.is_empty() => {
            session.record_mut().quality = if is_skip(quality) {
                None
            } else {
                Some(quality.to_string())
            };
            Step::Advance(StateTag::AskLinks, Prompt::AskLinks)
        }
        _ => Step::Stay(Prompt::AskQuality),
    }
}

fn links_answer(wants_link: bool) -> Step {
    if wants_link {
        Step::Advance(StateTag::AwaitingLinkLabel, Prompt::AskLinkLabel)
    } else {
        Step::Synthesize
    }
}

pub(crate) fn ask_links_choice(_: &mut Session, event: &Event, _: &FlowOptions) -> Step {
    match event {
        Event::Choice(answer) => links_answer(*answer),
        _ => Step::Ignore,
    }
}

pub(crate) fn ask_links_text(_: &mut Session, event: &Event, _: &FlowOptions) -> Step {
    match text(event).and_then(yes_no) {
        Some(answer) => links_answer(answer),
        None => Step::Stay(Prompt::AskLinks),
    }
}

pub(crate) fn link_label(session: &mut Session, event: &Event, _: &FlowOptions) -> Step {
    match text(event) {
        Some(label) if !label.is_empty() => {
            session.set_pending_label(Some(label.to_string()));
            Step::Advance(StateTag::AwaitingLinkUrl, Prompt::AskLinkUrl)
        }
        _ => Step::Stay(Prompt::AskLinkLabel),
    }
}

pub(crate) fn link_url(session: &mut Session, event: &Event, _: &FlowOptions) -> Step {
    let Some(url) = text(event) else {
        return Step::Stay(Prompt::InvalidUrl);
    };
    let label = session.pending_label().clone().unwrap_or_default();
    match LinkEntry::new(label, url) {
        Ok(link) => {
            session.push_link(link);
            Step::Advance(StateTag::AskLinks, Prompt::LinkAdded(session.links().len()))
        }
        Err(_) => Step::Stay(Prompt::InvalidUrl),
    }
}

pub(crate) fn done_text(_: &mut Session, event: &Event, _: &FlowOptions) -> Step {
    match text(event) {
        Some(query) if !query.is_empty() => Step::Restart(query.to_string()),
        _ => Step::Ignore,
    }
}

pub(crate) fn done_publish(_: &mut Session, event: &Event, _: &FlowOptions) -> Step {
    match event {
        Event::Publish(action) => Step::Publish(*action),
        _ => Step::Ignore,
    }
}
