use std::{fs::File, io::Write, path::Path};

use anyhow::Result;
use log::info;
use rust_xlsxwriter::Workbook;

use crate::Vote;

/// Column headers, in output order. "Average rading" is what downstream
/// consumers of these files already expect; leave it as is.
pub const COLUMNS: [&str; 4] = [
    "Film name and year",
    "Number of ratings",
    "User rating",
    "Average rading",
];

// spreadsheet apps need the BOM to pick UTF-8 over the locale encoding
const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

pub fn to_csv(votes: &[Vote], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();

    let mut file = File::create(path)?;
    file.write_all(UTF8_BOM)?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    // written unconditionally so an empty run still produces a header row
    writer.write_record(COLUMNS)?;
    for vote in votes {
        writer.serialize(vote)?;
    }
    writer.flush()?;

    info!("saved {} ratings to {}", votes.len(), path.display());
    Ok(())
}

pub fn to_xlsx(votes: &[Vote], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    for (col, name) in COLUMNS.iter().enumerate() {
        sheet.write_string(0, col as u16, *name)?;
    }
    for (row, vote) in votes.iter().enumerate() {
        let row = row as u32 + 1;
        sheet.write_string(row, 0, vote.film_name.as_str())?;
        sheet.write_string(row, 1, vote.rating_count.as_str())?;
        sheet.write_string(row, 2, vote.user_rating.as_str())?;
        sheet.write_string(row, 3, vote.average_rating.as_str())?;
    }
    workbook.save(path)?;

    info!("saved {} ratings to {}", votes.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{fs, path::PathBuf};

    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("kinopoisk-ratings-{}-{name}", std::process::id()))
    }

    fn sample_votes() -> Vec<Vote> {
        vec![
            Vote {
                film_name: "Начало (2010)".to_owned(),
                rating_count: "(512 345)".to_owned(),
                user_rating: "9".to_owned(),
                average_rating: "8.7".to_owned(),
            },
            Vote {
                film_name: "Unknown".to_owned(),
                rating_count: "Unknown".to_owned(),
                user_rating: "No rating".to_owned(),
                average_rating: "No rating".to_owned(),
            },
        ]
    }

    #[test]
    fn csv_round_trips_every_field() {
        let path = temp_path("roundtrip.csv");
        let votes = sample_votes();
        to_csv(&votes, &path).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));

        let mut reader = csv::Reader::from_reader(&bytes[UTF8_BOM.len()..]);
        assert_eq!(reader.headers().unwrap(), &COLUMNS[..]);

        let rows = reader
            .records()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(rows.len(), votes.len());
        for (row, vote) in rows.iter().zip(&votes) {
            assert_eq!(&row[0], vote.film_name);
            assert_eq!(&row[1], vote.rating_count);
            assert_eq!(&row[2], vote.user_rating);
            assert_eq!(&row[3], vote.average_rating);
        }

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn empty_csv_has_only_the_header() {
        let path = temp_path("empty.csv");
        to_csv(&[], &path).unwrap();

        let bytes = fs::read(&path).unwrap();
        let mut reader = csv::Reader::from_reader(&bytes[UTF8_BOM.len()..]);
        assert_eq!(reader.headers().unwrap(), &COLUMNS[..]);
        assert_eq!(reader.records().count(), 0);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn xlsx_is_written_for_empty_and_full_input() {
        let path = temp_path("full.xlsx");
        to_xlsx(&sample_votes(), &path).unwrap();
        assert!(fs::metadata(&path).unwrap().len() > 0);
        let _ = fs::remove_file(&path);

        let path = temp_path("empty.xlsx");
        to_xlsx(&[], &path).unwrap();
        assert!(fs::metadata(&path).unwrap().len() > 0);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn serde_column_names_match_the_header() {
        let mut writer = csv::Writer::from_writer(vec![]);
        writer.serialize(sample_votes().remove(0)).unwrap();
        let data = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert_eq!(data.lines().next().unwrap(), COLUMNS.join(","));
    }

    #[test]
    fn csv_fails_on_unwritable_path() {
        let path = temp_path("no-such-dir").join("out.csv");
        assert!(to_csv(&sample_votes(), &path).is_err());
    }
}
