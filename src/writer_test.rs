use super::VideoWriter;
use crate::encoder::Settings;
use crate::error::Error;
use crate::frame::rgb_len;
use crate::metadata::probe;
use crate::reader::VideoReader;
use crate::test_util::{init, pattern, synthesize};

#[test]
fn test_single_frame() -> anyhow::Result<()> {
    init();
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("single.mp4");

    let mut writer = VideoWriter::open(&path, 640, 480, 25.0, 1_000_000)?;
    writer.encode_frame(&pattern(640, 480, 0), 640, 480)?;
    assert_eq!(writer.frame_count(), 1);
    writer.finalize()?;
    drop(writer);

    let info = probe(&path)?;
    let video = info.video().expect("video stream");
    assert_eq!(video.frames, 1);
    assert_eq!((video.width, video.height), (Some(640), Some(480)));
    Ok(())
}

#[test]
fn test_finalize_is_idempotent() -> anyhow::Result<()> {
    init();
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("twice.mp4");

    let mut writer = VideoWriter::open(&path, 64, 48, 25.0, 200_000)?;
    for i in 0..5 {
        writer.encode_frame(&pattern(64, 48, i), 64, 48)?;
    }
    writer.finalize()?;
    writer.finalize()?;

    match writer.encode_frame(&pattern(64, 48, 5), 64, 48) {
        Err(Error::Finalized) => {}
        other => panic!("expected Finalized, got {:?}", other),
    }
    assert_eq!(writer.frame_count(), 5);
    drop(writer);

    assert_eq!(probe(&path)?.video().map(|v| v.frames), Some(5));
    Ok(())
}

#[test]
fn test_drop_finalizes() -> anyhow::Result<()> {
    init();
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("dropped.mp4");

    {
        let mut writer = VideoWriter::open(&path, 64, 48, 25.0, 200_000)?;
        for i in 0..10 {
            writer.encode_frame(&pattern(64, 48, i), 64, 48)?;
        }
    }

    let mut reader = VideoReader::open(&path)?;
    let mut rgb = vec![0u8; rgb_len(64, 48)];
    let mut count = 0;
    while reader.next_frame(&mut rgb)?.is_some() {
        count += 1;
    }
    assert_eq!(count, 10);
    Ok(())
}

#[test]
fn test_round_trip_keeps_frames() -> anyhow::Result<()> {
    init();
    let dir = tempfile::tempdir()?;
    let source = dir.path().join("source.mp4");
    let copy = dir.path().join("copy.mkv");
    synthesize(&source, 160, 120, 30.0, 60, 15)?;

    let mut reader = VideoReader::open(&source)?;
    let (width, height) = (reader.width(), reader.height());
    let mut writer = VideoWriter::open(&copy, width, height, reader.fps(), 500_000)?;
    let mut rgb = vec![0u8; rgb_len(width, height)];
    while reader.next_frame(&mut rgb)?.is_some() {
        writer.encode_frame(&rgb, width, height)?;
    }
    writer.finalize()?;
    let written = writer.frame_count();
    drop(writer);

    let mut reader = VideoReader::open(&copy)?;
    let mut stamps = Vec::new();
    while let Some(info) = reader.next_frame(&mut rgb)? {
        stamps.push(info.pts.unwrap_or_default());
    }
    assert!((written - stamps.len() as i64).abs() <= 1);
    assert!((59..=61).contains(&stamps.len()), "{} frames", stamps.len());
    assert!(stamps.windows(2).all(|w| w[0] <= w[1]));
    Ok(())
}

#[test]
fn test_input_is_rescaled() -> anyhow::Result<()> {
    init();
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("rescaled.mp4");

    let mut writer = VideoWriter::open(&path, 128, 96, 25.0, 200_000)?;
    writer.encode_frame(&pattern(64, 48, 0), 64, 48)?;
    writer.encode_frame(&pattern(256, 192, 1), 256, 192)?;
    writer.encode_frame(&pattern(128, 96, 2), 128, 96)?;
    writer.finalize()?;
    drop(writer);

    let info = probe(&path)?;
    let video = info.video().expect("video stream");
    assert_eq!(video.frames, 3);
    assert_eq!((video.width, video.height), (Some(128), Some(96)));
    Ok(())
}

#[test]
fn test_wrong_buffer_size() -> anyhow::Result<()> {
    init();
    let dir = tempfile::tempdir()?;
    let mut writer = VideoWriter::open(dir.path().join("short.mp4"), 64, 48, 25.0, 200_000)?;

    match writer.encode_frame(&[0u8; 10], 64, 48) {
        Err(Error::BufferSize { expected, actual }) => {
            assert_eq!(expected, rgb_len(64, 48));
            assert_eq!(actual, 10);
        }
        other => panic!("expected BufferSize, got {:?}", other),
    }
    assert_eq!(writer.frame_count(), 0);
    Ok(())
}

#[test]
fn test_gop_size_is_honored() -> anyhow::Result<()> {
    init();
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("gop.mp4");
    let settings = Settings {
        gop_size: 5,
        ..Settings::new(64, 48, 25.0, 200_000)?
    };
    let mut writer = VideoWriter::open_with(&path, settings)?;
    for i in 0..20 {
        writer.encode_frame(&pattern(64, 48, i), 64, 48)?;
    }
    drop(writer);

    let mut input = ffmpeg_next::format::input(&path)?;
    let keyframes = input
        .packets()
        .filter(|(_, packet)| packet.is_key())
        .count();
    assert!(keyframes >= 4, "{} keyframes", keyframes);
    Ok(())
}

#[test]
fn test_invalid_settings_create_nothing() -> anyhow::Result<()> {
    init();
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("never.mp4");

    match VideoWriter::open(&path, 0, 48, 25.0, 200_000) {
        Err(Error::Settings(_)) => {}
        Err(other) => panic!("expected Settings, got {}", other),
        Ok(_) => panic!("accepted a zero width"),
    }
    assert!(!path.exists());
    Ok(())
}

#[test]
fn test_unknown_container() -> anyhow::Result<()> {
    init();
    let dir = tempfile::tempdir()?;

    match VideoWriter::open(dir.path().join("out.notaformat"), 64, 48, 25.0, 200_000) {
        Err(Error::OutputContext { .. }) => {}
        Err(other) => panic!("expected OutputContext, got {}", other),
        Ok(_) => panic!("guessed a container for an unknown extension"),
    }
    Ok(())
}

#[test]
fn test_unwritable_path() -> anyhow::Result<()> {
    init();
    let dir = tempfile::tempdir()?;

    match VideoWriter::open(dir.path().join("missing/out.mp4"), 64, 48, 25.0, 200_000) {
        Err(Error::Create { .. }) => {}
        Err(other) => panic!("expected Create, got {}", other),
        Ok(_) => panic!("created a file in a missing directory"),
    }
    Ok(())
}
