//! End-to-end scenarios from spec section 8, exercised through the public
//! `codec::encode`/`codec::decode` pair and the GIF container.

use steganogif::codec;
use steganogif::color::Rgb8;
use steganogif::container;
use steganogif::envelope::DecodedEnvelope;

fn gradient_carrier(width: u32, height: u32) -> Vec<Rgb8> {
  (0..width * height)
    .map(|i| Rgb8::new((i % 256) as u8, ((i * 37) % 256) as u8, ((i * 101) % 256) as u8))
    .collect()
}

#[test]
fn tiny_round_trip_through_a_real_gif_container() {
  // spec section 8, scenario 1.
  let (width, height) = (32, 32);
  let carrier = gradient_carrier(width, height);
  let payload = b"ok".to_vec();

  let frames = codec::encode("pw", width, height, &carrier, 24, None, &payload).unwrap();
  let gif_bytes = container::encode_animation(&frames).unwrap();

  let decoded_frames = container::decode_animation(&gif_bytes).unwrap();
  match codec::decode("pw", decoded_frames).unwrap() {
    DecodedEnvelope::Payload(p) => assert_eq!(p, payload),
    DecodedEnvelope::NoContent => panic!("expected the payload back"),
  }
}

#[test]
fn multi_frame_payload_round_trips() {
  // spec section 8, scenario 2: 40x40 carrier (1600px = 200 bytes/frame),
  // 1024-byte payload, frame count = ceil(8*(2+1024+20)/1600) = 6.
  let (width, height) = (40, 40);
  let carrier = gradient_carrier(width, height);
  let payload: Vec<u8> = (0..1024u32).map(|i| (i * 31 + 7) as u8).collect();

  let frames = codec::encode("secret", width, height, &carrier, 24, None, &payload).unwrap();
  assert_eq!(frames.len(), 6);

  let gif_bytes = container::encode_animation(&frames).unwrap();
  let decoded_frames = container::decode_animation(&gif_bytes).unwrap();
  match codec::decode("secret", decoded_frames).unwrap() {
    DecodedEnvelope::Payload(p) => assert_eq!(p, payload),
    DecodedEnvelope::NoContent => panic!("expected the payload back"),
  }
}

#[test]
fn wrong_password_reports_no_content_and_writes_nothing() {
  // spec section 8, scenario 3.
  let (width, height) = (32, 32);
  let carrier = gradient_carrier(width, height);
  let payload = b"ok".to_vec();

  let frames = codec::encode("pw", width, height, &carrier, 24, None, &payload).unwrap();
  let gif_bytes = container::encode_animation(&frames).unwrap();
  let decoded_frames = container::decode_animation(&gif_bytes).unwrap();

  match codec::decode("pw2", decoded_frames).unwrap() {
    DecodedEnvelope::NoContent => {}
    DecodedEnvelope::Payload(_) => panic!("wrong password must not recover a payload"),
  }
}

#[test]
fn odd_geometry_fails_before_any_container_work() {
  // spec section 8, scenario 4.
  let carrier = gradient_carrier(33, 32);
  let err = codec::encode("pw", 33, 32, &carrier, 24, None, b"x").unwrap_err();
  assert!(matches!(err, steganogif::SteganoError::BadGeometry { width: 33, height: 32 }));
}

#[test]
fn empty_payload_round_trips_in_a_single_frame() {
  // spec section 8, boundary behavior: payload_size = 0.
  let (width, height) = (16, 16);
  let carrier = gradient_carrier(width, height);

  let frames = codec::encode("pw", width, height, &carrier, 24, None, &[]).unwrap();
  assert_eq!(frames.len(), 1);

  match codec::decode("pw", frames).unwrap() {
    DecodedEnvelope::Payload(p) => assert!(p.is_empty()),
    DecodedEnvelope::NoContent => panic!("expected an empty payload, not no-content"),
  }
}
