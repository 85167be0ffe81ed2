use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use radius_proto::auth::{decrypt_user_password, encrypt_user_password, generate_request_authenticator};
use radius_proto::{Attribute, Code, DecodeOptions, Packet, SharedSecret};

fn create_test_packet(secret: &SharedSecret, num_attributes: usize) -> Packet {
    let req_auth = generate_request_authenticator();
    let mut packet = Packet::new(Code::AccessRequest, 1, req_auth);

    packet.add_attribute(Attribute::user_name("testuser").expect("User-Name"));
    packet.add_attribute(
        Attribute::user_password("testpassword", secret, req_auth).expect("User-Password"),
    );

    // Additional attributes to test scaling
    for i in 0..num_attributes {
        packet.add_attribute(Attribute::reply_message(format!("attribute_{}", i)).expect("Reply-Message"));
    }

    packet
}

fn bench_packet_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("packet_encode");
    let secret = SharedSecret::from("testing123");

    for num_attrs in [0, 5, 10, 20].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(num_attrs), num_attrs, |b, &num_attrs| {
            let packet = create_test_packet(&secret, num_attrs);
            b.iter(|| packet.encode().expect("Failed to encode packet"));
        });
    }

    group.finish();
}

fn bench_packet_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("packet_decode");
    let secret = SharedSecret::from("testing123");
    let options = DecodeOptions::default();

    for num_attrs in [0, 5, 10, 20].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(num_attrs), num_attrs, |b, &num_attrs| {
            let encoded = create_test_packet(&secret, num_attrs).encode().expect("Failed to encode");
            b.iter(|| {
                Packet::decode(black_box(&encoded), &secret, &options).expect("Failed to decode packet")
            });
        });
    }

    group.finish();
}

fn bench_password_cipher(c: &mut Criterion) {
    let mut group = c.benchmark_group("password_cipher");
    let secret = SharedSecret::from("testing123");
    let req_auth = generate_request_authenticator();

    let passwords = [
        ("short", "test"),
        ("medium", "testpassword123"),
        ("long", "this_is_a_very_long_password_to_test_performance"),
    ];

    for (name, password) in passwords.iter() {
        group.bench_with_input(BenchmarkId::new("encrypt", name), password, |b, &password| {
            b.iter(|| encrypt_user_password(black_box(password), &secret, black_box(&req_auth)));
        });

        let encrypted = encrypt_user_password(password, &secret, &req_auth);
        group.bench_with_input(BenchmarkId::new("decrypt", name), &encrypted, |b, encrypted| {
            b.iter(|| decrypt_user_password(black_box(encrypted), &secret, black_box(&req_auth)));
        });
    }

    group.finish();
}

fn bench_response_cycle(c: &mut Criterion) {
    let secret = SharedSecret::from("testing123");
    let options = DecodeOptions::default();
    let request = create_test_packet(&secret, 2).encode().expect("Failed to encode");

    c.bench_function("decode_request_encode_response", |b| {
        b.iter(|| {
            let decoded = Packet::decode(black_box(&request), &secret, &options).expect("Failed to decode");
            let mut response = Packet::reply(&decoded, Code::AccessAccept);
            response.add_attribute(Attribute::session_timeout(3600).expect("Session-Timeout"));
            black_box(response.encode_response(&secret).expect("Failed to encode response"))
        });
    });
}

criterion_group!(
    benches,
    bench_packet_encode,
    bench_packet_decode,
    bench_password_cipher,
    bench_response_cycle
);
criterion_main!(benches);
