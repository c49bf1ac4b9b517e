#![feature(test)]

extern crate test;

use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};
use rsa_keymat::{EncryptionScheme, RsaKeyMaterial};
use sha2::{Digest, Sha256};
use test::Bencher;

fn get_key() -> RsaKeyMaterial {
    let mut rng = ChaCha8Rng::from_seed([7; 32]);
    rsa_keymat::generate(&mut rng, 2048, 65537).unwrap()
}

#[bench]
fn bench_rsa_1024_gen_key(b: &mut Bencher) {
    let mut rng = ChaCha8Rng::from_seed([42; 32]);

    b.iter(|| {
        let key = rsa_keymat::generate(&mut rng, 1024, 65537).unwrap();
        test::black_box(key);
    });
}

#[bench]
fn bench_rsa_2048_complete(b: &mut Bencher) {
    let key = get_key();
    let mut partial = RsaKeyMaterial::default();
    partial.p = key.p.clone();
    partial.q = key.q.clone();
    partial.e = key.e.clone();
    let mut rng = ChaCha8Rng::from_seed([42; 32]);

    b.iter(|| {
        let res = partial.complete(&mut rng).unwrap();
        test::black_box(res);
    });
}

#[bench]
fn bench_rsa_2048_verify_consistency(b: &mut Bencher) {
    let key = get_key();

    b.iter(|| {
        test::black_box(key.verify_consistency());
    });
}

#[bench]
fn bench_rsa_2048_pkcsv1_decrypt(b: &mut Bencher) {
    let key = get_key();
    let mut rng = ChaCha8Rng::from_seed([42; 32]);
    let x = rsa_keymat::encrypt(&mut rng, EncryptionScheme::Pkcs1v15, b"testing", &key.to_public())
        .unwrap();

    b.iter(|| {
        let res = rsa_keymat::decrypt(&mut rng, EncryptionScheme::Pkcs1v15, &x, &key).unwrap();
        test::black_box(res);
    });
}

#[bench]
fn bench_rsa_2048_pkcsv1_sign_blinded(b: &mut Bencher) {
    let key = get_key();
    let digest = Sha256::digest(b"testing").to_vec();
    let mut rng = ChaCha8Rng::from_seed([42; 32]);

    b.iter(|| {
        let res = rsa_keymat::sign(&mut rng, "sha256", &digest, &key).unwrap();
        test::black_box(res);
    });
}

#[bench]
fn bench_rsa_2048_der_roundtrip(b: &mut Bencher) {
    let key = get_key();

    b.iter(|| {
        let der = key.to_pkcs1_der().unwrap();
        let res = RsaKeyMaterial::from_pkcs1_der(der.as_bytes()).unwrap();
        test::black_box(res);
    });
}
