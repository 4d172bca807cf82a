//! End-to-end properties of the Ogg and Opus layers working together.

use bytes::Bytes;

use opuscraft_codec::ogg::{
    self, ChecksumMode, DemuxOptions, Demuxer, ErrorKind, LogicalStream, Muxer, Page, PageHeader,
    PageReader, flags, lacing_values, page_checksum,
};
use opuscraft_codec::opus::{
    self, Configuration, ConfigurationMode, FrameCode, OpusFile, OpusHead, OpusPacket, OpusTags,
    PacketPool, PagingPolicy, TOC,
};

/// Builds a page from raw lacing values and body, with a valid checksum.
fn raw_page(header_type: u8, serial: u32, sequence: u32, lacing: &[u8], body: &[u8]) -> Vec<u8> {
    let header = PageHeader {
        header_type,
        granule_position: 0,
        serial,
        sequence,
        checksum: 0,
        segments: lacing.len() as u8,
    };
    let mut out = header.to_bytes().to_vec();
    out.extend_from_slice(lacing);
    out.extend_from_slice(body);
    let crc = page_checksum(&out);
    out[22..26].copy_from_slice(&crc.to_le_bytes());
    out
}

fn pages_of(packets: &[Vec<u8>], per_page: usize) -> Vec<Page> {
    packets
        .chunks(per_page)
        .enumerate()
        .map(|(i, chunk)| {
            Page::new(
                (i as u64 + 1) * 960,
                chunk.iter().map(|p| Bytes::copy_from_slice(p)).collect(),
            )
        })
        .collect()
}

fn ogg_kind(result: ogg::Result<Vec<LogicalStream>>) -> ErrorKind {
    match result {
        Err(e) => e.kind,
        Ok(streams) => panic!("expected error, got {} streams", streams.len()),
    }
}

#[test]
fn mux_demux_preserves_packets() {
    let packets: Vec<Vec<u8>> = [0usize, 1, 254, 255, 256, 510, 1000, 64 * 255]
        .iter()
        .enumerate()
        .map(|(i, &len)| vec![i as u8; len])
        .collect();
    let pages = pages_of(&packets, 3);

    let mut muxer = Muxer::new(Vec::new(), 0xdead_beef);
    muxer.write_stream(&pages).unwrap();
    let data = muxer.into_inner();

    let streams = ogg::demux(data).unwrap();
    assert_eq!(streams.len(), 1);
    assert_eq!(streams[0].serial, 0xdead_beef);
    let got: Vec<&[u8]> = streams[0].packets().map(|p| p.as_ref()).collect();
    let want: Vec<&[u8]> = packets.iter().map(|p| p.as_slice()).collect();
    assert_eq!(got, want);
    for (got, want) in streams[0].pages.iter().zip(&pages) {
        assert_eq!(got.granule_position, want.granule_position);
        assert_eq!(got.packets.len(), want.packets.len());
    }
}

#[test]
fn muxed_pages_have_valid_checksums_and_sequence() {
    let packets: Vec<Vec<u8>> = (0..10u8).map(|i| vec![i; 100 + i as usize]).collect();
    let data = LogicalStream::with_pages(5, pages_of(&packets, 2)).to_bytes().unwrap();

    let pages: Vec<_> = PageReader::new(&data[..], ChecksumMode::Reject)
        .collect::<ogg::Result<_>>()
        .unwrap();
    assert_eq!(pages.len(), 5);

    let mut end = 0;
    for (i, page) in pages.iter().enumerate() {
        assert_eq!(page.offset, end);
        end += page.len();

        let bytes = &data[page.offset..page.offset + page.len()];
        let stored = u32::from_le_bytes([bytes[22], bytes[23], bytes[24], bytes[25]]);
        assert_eq!(page_checksum(bytes), stored);
        assert!(page.checksum_valid);

        assert_eq!(page.header.sequence, i as u32);
        assert_eq!(page.header.serial, 5);
        assert_eq!(page.header.is_bos(), i == 0);
        assert_eq!(page.header.is_eos(), i == 4);
        assert!(!page.header.is_continuation());
    }
    assert_eq!(end, data.len());
}

#[test]
fn lacing_encodes_packet_lengths() {
    let lacing = |len: usize| lacing_values(len).collect::<Vec<_>>();
    assert_eq!(lacing(0), vec![0]);
    assert_eq!(lacing(100), vec![100]);
    assert_eq!(lacing(255), vec![255, 0]);
    assert_eq!(lacing(300), vec![255, 45]);
    assert_eq!(lacing(510), vec![255, 255, 0]);
    for len in [0, 1, 254, 255, 256, 765, 1000] {
        let values = lacing(len);
        assert_eq!(values.iter().map(|&v| v as usize).sum::<usize>(), len);
        assert!(*values.last().unwrap() < 255);
        assert!(values[..values.len() - 1].iter().all(|&v| v == 255));
        assert_eq!(values.iter().filter(|&&v| v == 255).count(), len / 255);
    }
}

#[test]
fn packet_spanning_pages_is_reassembled() {
    let body = vec![0x5a; 600];
    let mut data = raw_page(flags::BOS, 9, 0, &[4], b"head");
    data.extend(raw_page(0, 9, 1, &[255, 255], &body[..510]));
    data.extend(raw_page(flags::CONTINUATION | flags::EOS, 9, 2, &[90, 2], &[&body[510..], &b"ok"[..]].concat()));

    let streams = ogg::demux(data).unwrap();
    let stream = &streams[0];
    assert!(stream.pages[1].packets.is_empty());
    assert_eq!(stream.pages[2].packets.len(), 2);
    assert_eq!(stream.pages[2].packets[0].as_ref(), &body[..]);
    assert_eq!(stream.pages[2].packets[1].as_ref(), b"ok");
}

#[test]
fn demux_rejects_malformed_input() {
    // Truncated body
    let mut data = raw_page(flags::BOS | flags::EOS, 1, 0, &[10], &[0; 10]);
    data.truncate(data.len() - 3);
    assert!(matches!(ogg_kind(ogg::demux(data)), ErrorKind::Truncated));

    // Garbage instead of a capture pattern
    assert!(matches!(
        ogg_kind(ogg::demux(vec![b'X'; 40])),
        ErrorKind::BadCapturePattern
    ));

    // Unknown version
    let mut data = raw_page(flags::BOS | flags::EOS, 1, 0, &[1], b"a");
    data[4] = 1;
    assert!(matches!(ogg_kind(ogg::demux(data)), ErrorKind::UnsupportedVersion(1)));

    // Second start page
    let mut data = raw_page(flags::BOS, 1, 0, &[1], b"a");
    data.extend(raw_page(flags::BOS, 1, 1, &[1], b"b"));
    assert!(matches!(ogg_kind(ogg::demux(data)), ErrorKind::MultipleStartPages(1)));

    // No start page
    let data = raw_page(flags::EOS, 1, 0, &[1], b"a");
    assert!(matches!(ogg_kind(ogg::demux(data)), ErrorKind::NoStartPage(1)));

    // Sequence gap
    let mut data = raw_page(flags::BOS, 1, 0, &[1], b"a");
    data.extend(raw_page(flags::EOS, 1, 2, &[1], b"b"));
    assert!(matches!(
        ogg_kind(ogg::demux(data)),
        ErrorKind::SequenceMismatch { expected: 1, got: 2 }
    ));

    // Packet left open at the end page
    let data = raw_page(flags::BOS | flags::EOS, 1, 0, &[255], &[0; 255]);
    assert!(matches!(ogg_kind(ogg::demux(data)), ErrorKind::IncompletePacket));

    // Missing end page
    let data = raw_page(flags::BOS, 1, 0, &[1], b"a");
    assert!(matches!(ogg_kind(ogg::demux(data)), ErrorKind::UnterminatedStream(1)));
}

#[test]
fn checksum_modes() {
    let mut data = raw_page(flags::BOS | flags::EOS, 3, 0, &[5], b"hello");
    data[HEADER_BODY_BYTE] ^= 0xff;

    let strict = Demuxer::default().demux(data.clone());
    match strict {
        Err(e) => {
            assert!(e.is_integrity());
            assert_eq!(e.page_offset, 0);
        }
        Ok(_) => panic!("corrupted page accepted"),
    }

    let warn = Demuxer::new(DemuxOptions { checksum: ChecksumMode::Warn });
    let streams = warn.demux(data.clone()).unwrap();
    assert!(!streams[0].pages[0].checksum_valid);

    let ignore = Demuxer::new(DemuxOptions { checksum: ChecksumMode::Ignore });
    let streams = ignore.demux(data).unwrap();
    assert!(streams[0].pages[0].checksum_valid);
}

/// First body byte of a page with a one-value segment table.
const HEADER_BODY_BYTE: usize = 28;

#[test]
fn toc_roundtrip_over_all_configurations() {
    let codes = [
        FrameCode::OneFrame,
        FrameCode::TwoEqualFrames,
        FrameCode::TwoDifferentFrames,
    ];
    for config in 0..32u8 {
        for stereo in [false, true] {
            for code in codes {
                let frames = match code {
                    FrameCode::OneFrame => vec![Bytes::from_static(&[1, 2, 3])],
                    FrameCode::TwoEqualFrames => {
                        vec![Bytes::from_static(&[1, 2]), Bytes::from_static(&[3, 4])]
                    }
                    _ => vec![Bytes::from(vec![7u8; 300]), Bytes::from_static(&[9])],
                };
                let packet = OpusPacket::encode(Configuration(config), stereo, code, frames.clone()).unwrap();
                let decoded = OpusPacket::decode(packet.data().clone()).unwrap();

                let toc = TOC::from_parts(decoded.configuration(), decoded.is_stereo(), decoded.frame_code());
                assert_eq!(toc, packet.toc());
                assert_eq!(toc.0, packet.data()[0]);
                assert_eq!(decoded.configuration(), Configuration(config));
                assert_eq!(decoded.is_stereo(), stereo);
                assert_eq!(decoded.frame_code(), code);
                assert_eq!(decoded.frames(), &frames[..]);
                assert_eq!(decoded.samples(), decoded.frame_samples() * frames.len() as u32);
            }
        }
    }
}

#[test]
fn opus_packet_rejections() {
    assert!(matches!(OpusPacket::decode(Vec::new()), Err(opus::Error::EmptyPacket)));
    assert!(matches!(
        OpusPacket::decode(vec![0x01, 1, 2, 3]),
        Err(opus::Error::OddCodeOneLength(3))
    ));
    assert!(matches!(
        OpusPacket::decode(vec![0x03, 0x01, 0]),
        Err(opus::Error::UnsupportedFrameCode3)
    ));
    assert!(matches!(
        OpusPacket::decode(vec![0x02, 10, 1, 2]),
        Err(opus::Error::TruncatedPacket)
    ));
}

#[test]
fn opus_file_end_to_end() {
    // Three 20 ms narrowband CELT packets
    let mut pool = PacketPool::new();
    for i in 0..3u8 {
        let packet = OpusPacket::encode(
            Configuration(19),
            false,
            FrameCode::OneFrame,
            vec![Bytes::from(vec![i; 20])],
        )
        .unwrap();
        assert_eq!(packet.samples(), 960);
        let id = pool.add(packet).unwrap();
        pool.emit(id).unwrap();
    }

    let head = OpusHead {
        channels: 1,
        pre_skip: 312,
        input_sample_rate: 16000,
        ..OpusHead::default()
    };
    let tags = OpusTags {
        vendor: "test".to_string(),
        comments: vec!["ARTIST=someone".to_string()],
    };
    let file = pool.into_file(head, tags);
    let data = file.to_bytes(&PagingPolicy::default()).unwrap();

    let streams = ogg::demux(data.clone()).unwrap();
    assert_eq!(streams[0].pages.len(), 3);
    assert_eq!(streams[0].granule_position(), 2880);

    let decoded = OpusFile::decode_ogg(data).unwrap();
    assert_eq!(decoded, file);
    assert_eq!(decoded.head.pre_skip, 312);
    assert_eq!(decoded.tags.get("artist").collect::<Vec<_>>(), vec!["someone"]);
    assert_eq!(decoded.total_samples(), 2880);
}

#[test]
fn single_celt_packet_stream() {
    // Config 19: CELT, 8 kHz class, 20 ms
    let toc = TOC::from_parts(Configuration(19), false, FrameCode::OneFrame);
    assert_eq!(toc.0, 0x98);
    let packet = OpusPacket::decode(vec![toc.0, 0xde, 0xad]).unwrap();

    let head = OpusHead {
        channels: 2,
        pre_skip: 3840,
        ..OpusHead::default()
    };
    let file = OpusFile::new(head, OpusTags::default(), vec![packet]);
    let data = file.to_bytes(&PagingPolicy::default()).unwrap();
    assert_eq!(ogg::demux(data.clone()).unwrap()[0].pages.len(), 3);

    let decoded = OpusFile::decode_ogg(data).unwrap();
    assert_eq!(decoded.head.channels, 2);
    assert_eq!(decoded.head.pre_skip, 3840);
    assert_eq!(decoded.packets.len(), 1);
    let packet = &decoded.packets[0];
    assert_eq!(packet.mode(), ConfigurationMode::CELT);
    assert_eq!(packet.samples(), 960);
    assert_eq!(packet.frames()[0].as_ref(), &[0xde, 0xad]);
}

#[test]
fn opus_file_skips_foreign_streams() {
    let mut data = raw_page(flags::BOS | flags::EOS, 1, 0, &[6], b"Speex!");
    let file = OpusFile::new(OpusHead::default(), OpusTags::default(), Vec::new());
    let mut stream = file.to_stream(&PagingPolicy::default());
    stream.serial = 2;
    data.extend(stream.to_bytes().unwrap());

    let decoded = OpusFile::decode_ogg(data).unwrap();
    assert_eq!(decoded.serial, 2);
    assert!(decoded.packets.is_empty());

    let only_foreign = raw_page(flags::BOS | flags::EOS, 1, 0, &[6], b"Speex!");
    assert!(matches!(OpusFile::decode_ogg(only_foreign), Err(opus::Error::NoOpusStream)));
}
