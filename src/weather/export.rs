use rust_xlsxwriter::Workbook;
use time::macros::format_description;
use time::OffsetDateTime;

use crate::weather::repo::WeatherReading;

const XLSX_SHEET_NAME: &str = "Weather data";
const XLSX_COLUMNS: [(&str, f64); 5] = [
    ("Date/Time", 25.0),
    ("Temperature (°C)", 15.0),
    ("Wind (km/h)", 15.0),
    ("Latitude", 15.0),
    ("Longitude", 15.0),
];

/// Unix seconds as a `DD/MM/YYYY HH:MM:SS` string. An unrepresentable
/// timestamp becomes an empty cell, never an error.
pub fn format_timestamp(unix_seconds: i64) -> String {
    let format = format_description!("[day]/[month]/[year] [hour]:[minute]:[second]");
    OffsetDateTime::from_unix_timestamp(unix_seconds)
        .ok()
        .and_then(|dt| dt.format(format).ok())
        .unwrap_or_default()
}

/// Five-column CSV over the given readings, header row first.
pub fn to_csv(readings: &[WeatherReading]) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["timestamp", "temperature", "windspeed", "latitude", "longitude"])?;
    for r in readings {
        writer.write_record([
            format_timestamp(r.timestamp),
            r.temperature.to_string(),
            r.windspeed.to_string(),
            r.latitude.clone(),
            r.longitude.clone(),
        ])?;
    }
    let bytes = writer.into_inner()?;
    Ok(String::from_utf8(bytes)?)
}

/// Single-sheet workbook with the same rows and values as the CSV,
/// fixed headers and column widths.
pub fn to_xlsx(readings: &[WeatherReading]) -> anyhow::Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(XLSX_SHEET_NAME)?;

    for (col, (header, width)) in XLSX_COLUMNS.iter().enumerate() {
        let col = col as u16;
        worksheet.set_column_width(col, *width)?;
        worksheet.write_string(0, col, *header)?;
    }

    for (i, r) in readings.iter().enumerate() {
        let row = (i + 1) as u32;
        worksheet.write_string(row, 0, format_timestamp(r.timestamp))?;
        worksheet.write_number(row, 1, r.temperature)?;
        worksheet.write_number(row, 2, r.windspeed)?;
        worksheet.write_string(row, 3, r.latitude.as_str())?;
        worksheet.write_string(row, 4, r.longitude.as_str())?;
    }

    Ok(workbook.save_to_buffer()?)
}
