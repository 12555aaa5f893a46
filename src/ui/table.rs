use tabled::{settings::Style, Table, Tabled};

use crate::place::PlacePhotoRecord;

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

#[derive(Tabled)]
pub struct PhotoRow {
    #[tabled(rename = "Place")]
    pub place_name: String,
    #[tabled(rename = "Source")]
    pub source: String,
    #[tabled(rename = "Updated")]
    pub updated_at: String,
    #[tabled(rename = "Image URL")]
    pub image_url: String,
}

impl From<&PlacePhotoRecord> for PhotoRow {
    fn from(record: &PlacePhotoRecord) -> Self {
        Self {
            place_name: record.place_name.clone(),
            source: record.source.to_string(),
            updated_at: record.updated_at.format("%Y-%m-%d %H:%M").to_string(),
            image_url: shorten(&record.image_url, 72),
        }
    }
}

fn shorten(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let head: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{}…", head)
}

#[derive(Default)]
pub struct TableBuilder {
    rows: Vec<TableRow>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn add_row(&mut self, label: &str, value: &str) {
        self.rows.push(TableRow {
            metric: label.to_string(),
            value: value.to_string(),
        });
    }

    pub fn build(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }

        Table::new(&self.rows).with(Style::rounded()).to_string()
    }
}

pub fn stats_table(stats: &[(&str, &str)]) -> String {
    let mut builder = TableBuilder::new();
    for (label, value) in stats {
        builder.add_row(label, value);
    }
    builder.build()
}

pub fn photo_table(records: &[PlacePhotoRecord]) -> String {
    if records.is_empty() {
        return String::new();
    }
    let rows: Vec<PhotoRow> = records.iter().map(PhotoRow::from).collect();
    Table::new(&rows).with(Style::rounded()).to_string()
}
