//! Compile-time smoke test: verify top-level re-exports work.

use seiswave::{
    decode_seisan, decode_win, ByteOrder, ChannelId, FilterCoeffs, LengthWidth, Result,
    SeisError, SeisanChannel, SeisanFileHeader, SliceWave, Spectrogram, Wave, WaveStats,
    WinDecoder, NO_DATA,
};

#[test]
fn top_level_imports_compile() {
    // Just verify the types are usable from the crate root
    let _: fn(&[u8]) -> Result<Vec<(u8, Wave)>> = decode_win;
    let _: fn(&[u8]) -> Result<(SeisanFileHeader, Vec<SeisanChannel>)> = decode_seisan;

    let _bo = ByteOrder::Big;
    let _lw = LengthWidth::Four;
    let _nd: i32 = NO_DATA;
    let _id = ChannelId::from_parts("NZ", "WIZ", "10", "HHZ");
    let _coeffs = FilterCoeffs::new(vec![1.0], vec![1.0]);
    let _dec = WinDecoder::new();

    let w = Wave::new(vec![1, 2, 3, 4], 0.0, 2.0);
    let _stats: WaveStats = w.stats();
    let view = SliceWave::whole(&w);
    let _spec = Spectrogram::new(&view.to_samples(), 2.0, 4, 4, 0, 0.0);

    // SeisError is accessible
    let _e: Option<SeisError> = None;
}

#[test]
fn decode_then_analyze_pipeline() {
    // A tiny end-to-end pass: WIN bytes -> Wave -> SliceWave -> wire format
    let mut packet = Vec::new();
    let block: &[u8] = &[
        0x00, 0x01, // reserved, channel 1
        0x10, 0x04, // width 1, 4 samples
        0x00, 0x00, 0x00, 0x64, // base 100
        0x05, 0xFD, 0x0A, // deltas +5, -3, +10
    ];
    packet.extend_from_slice(&((10 + block.len()) as u32).to_be_bytes());
    packet.extend_from_slice(&[0x07, 0x03, 0x15, 0x12, 0x30, 0x45]);
    packet.extend_from_slice(block);

    let waves = decode_win(&packet).unwrap();
    assert_eq!(waves.len(), 1);
    let wave = &waves[0].1;
    assert_eq!(wave.samples(), &[100, 105, 102, 112]);

    let view = SliceWave::whole(wave);
    assert_eq!(view.mean(), 104.75);

    let back = Wave::from_binary(&wave.to_binary()).unwrap();
    assert_eq!(&back, wave);
}
