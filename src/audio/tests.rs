use std::fs;
use std::path::Path;

use lofty::config::WriteOptions;
use lofty::picture::{MimeType, Picture, PictureType};
use lofty::prelude::{Accessor, TagExt};
use lofty::tag::{Tag, TagType};
use tempfile::tempdir;

use super::metadata::{
    PLACEHOLDER_ARTIST, PLACEHOLDER_TITLE, SongInfo, artwork_kind, mime_extension, read_tags,
};
use super::sink::open_source;
use super::types::AudioError;

#[test]
fn open_source_reports_missing_file_as_open_error() {
    let Err(err) = open_source(Path::new("/definitely/not/here.mp3")) else {
        panic!("missing file must not open");
    };
    assert!(matches!(err, AudioError::Open { .. }));
    assert!(err.to_string().contains("here.mp3"));
}

#[test]
fn open_source_reports_garbage_as_decode_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.mp3");
    fs::write(&path, b"this is not audio").unwrap();

    let Err(err) = open_source(&path) else {
        panic!("garbage must not decode");
    };
    assert!(matches!(err, AudioError::Decode { .. }));
}

#[test]
fn read_tags_of_untagged_file_falls_back_to_placeholders() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.mp3");
    fs::write(&path, b"this is not audio").unwrap();

    let report = read_tags(&path);
    assert_eq!(report.info, SongInfo::placeholder());
    assert_eq!(report.duration, None);
}

#[test]
fn placeholder_uses_constant_labels() {
    let info = SongInfo::default();
    assert_eq!(info.title, PLACEHOLDER_TITLE);
    assert_eq!(info.artist, PLACEHOLDER_ARTIST);
    assert!(info.artwork.is_none());
    assert!(info.is_placeholder());

    let tagged = SongInfo {
        title: "Sixteen".to_string(),
        ..SongInfo::placeholder()
    };
    assert!(!tagged.is_placeholder());
}

#[test]
fn artwork_kind_sniffs_common_formats() {
    assert_eq!(artwork_kind(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A]), "png");
    assert_eq!(artwork_kind(&[0xFF, 0xD8, 0xFF, 0xE0]), "jpg");
    assert_eq!(artwork_kind(b"GIF89a"), "gif");
    assert_eq!(artwork_kind(b"RIFF\0\0\0\0WEBPVP8 "), "webp");
    assert_eq!(artwork_kind(b"??"), "img");
}

#[test]
fn mime_type_from_tag_names_the_artwork() {
    assert_eq!(mime_extension(&MimeType::Png), Some("png"));
    assert_eq!(mime_extension(&MimeType::Jpeg), Some("jpg"));
    assert_eq!(mime_extension(&MimeType::Unknown("image/x-odd".to_string())), None);
}

/// 0.1s of mono 16-bit silence at 8 kHz.
fn silent_wav() -> Vec<u8> {
    let samples = vec![0u8; 1600];
    let mut v = Vec::new();
    v.extend_from_slice(b"RIFF");
    v.extend_from_slice(&(36 + samples.len() as u32).to_le_bytes());
    v.extend_from_slice(b"WAVEfmt ");
    v.extend_from_slice(&16u32.to_le_bytes());
    v.extend_from_slice(&1u16.to_le_bytes());
    v.extend_from_slice(&1u16.to_le_bytes());
    v.extend_from_slice(&8000u32.to_le_bytes());
    v.extend_from_slice(&16000u32.to_le_bytes());
    v.extend_from_slice(&2u16.to_le_bytes());
    v.extend_from_slice(&16u16.to_le_bytes());
    v.extend_from_slice(b"data");
    v.extend_from_slice(&(samples.len() as u32).to_le_bytes());
    v.extend_from_slice(&samples);
    v
}

fn png_cover() -> Picture {
    let mut data = b"\x89PNG\r\n\x1a\n".to_vec();
    data.resize(64, 0);
    let mut picture = Picture::from_reader(&mut data.as_slice()).unwrap();
    picture.set_pic_type(PictureType::CoverFront);
    picture
}

fn write_tagged(path: &Path, title: &str, artist: &str, cover: Option<Picture>) {
    fs::write(path, silent_wav()).unwrap();
    let mut tag = Tag::new(TagType::Id3v2);
    tag.set_title(title.to_string());
    tag.set_artist(artist.to_string());
    if let Some(cover) = cover {
        tag.push_picture(cover);
    }
    tag.save_to_path(path, WriteOptions::default()).unwrap();
}

#[test]
fn read_tags_extracts_title_artist_and_cover() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tagged.wav");
    write_tagged(&path, "Sixteen", "Some Band", Some(png_cover()));

    let report = read_tags(&path);
    assert_eq!(report.info.title, "Sixteen");
    assert_eq!(report.info.artist, "Some Band");
    let art = report.info.artwork.expect("cover should be read");
    assert_eq!(art.kind, "png");
    assert_eq!(art.data.len(), 64);
    assert!(report.duration.is_some());
}

#[test]
fn read_tags_falls_back_for_blank_fields() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("blank.wav");
    write_tagged(&path, "   ", "Some Band", None);

    let report = read_tags(&path);
    assert_eq!(report.info.title, PLACEHOLDER_TITLE);
    assert_eq!(report.info.artist, "Some Band");
    assert!(report.info.artwork.is_none());
}
