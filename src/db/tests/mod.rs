use crate::types::NewHistoryRecord;

mod history;

/// A history record with distinguishable fields
fn sample_record(title: &str) -> NewHistoryRecord {
    NewHistoryRecord {
        url: format!("https://www.youtube.com/watch?v={title}"),
        title: title.to_string(),
        thumbnail_url: Some(format!("https://i.ytimg.com/vi/{title}/hq.jpg")),
        selector: "bestaudio[ext=m4a]/bestaudio/best".into(),
        format_label: "M4A (audio only)".into(),
        duration_seconds: Some(212.5),
        file_size_bytes: Some(3_437_753),
        file_name: format!("{title}-1700000000000.m4a"),
        stored_path: format!("/srv/dl/{title}-1700000000000.m4a"),
    }
}
