use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use webpush::vapid::build_assertion;
use webpush::{FileSigner, PushError, RotatingSigner, SignerError};
use webpush_crypto::{base64url_decode, sha256, verify_prehash};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn advertised_key_always_signed_the_jwt_while_rotating() {
    let keys: Vec<Arc<FileSigner>> = (0..4)
        .map(|_| Arc::new(FileSigner::random().unwrap()))
        .collect();
    let rotating = Arc::new(RotatingSigner::new(keys[0].clone()));
    let stop = Arc::new(AtomicBool::new(false));

    let rotator = {
        let rotating = rotating.clone();
        let stop = stop.clone();
        std::thread::spawn(move || {
            for signer in keys.iter().cycle() {
                if stop.load(Ordering::SeqCst) {
                    break;
                }
                rotating.rotate(signer.clone());
                std::thread::sleep(Duration::from_millis(5));
            }
        })
    };

    let mut tasks = Vec::new();
    for _ in 0..4 {
        let rotating = rotating.clone();
        tasks.push(tokio::spawn(async move {
            let mut accepted = 0;
            for _ in 0..50 {
                let assertion = match build_assertion(
                    "https://push.example.com/abc",
                    "mailto:ops@example.com",
                    rotating.as_ref(),
                )
                .await
                {
                    Ok(assertion) => assertion,
                    Err(PushError::SigningFailed(SignerError::KeyRotated { .. })) => continue,
                    Err(e) => panic!("unexpected error: {e}"),
                };

                let (signing_input, signature) = assertion.jwt.rsplit_once('.').unwrap();
                let advertised = base64url_decode(&assertion.public_key).unwrap();
                assert!(
                    verify_prehash(
                        &advertised,
                        &sha256(signing_input.as_bytes()),
                        &base64url_decode(signature).unwrap()
                    ),
                    "k= does not match the key that signed the JWT"
                );
                accepted += 1;
            }
            accepted
        }));
    }

    let mut accepted = 0;
    for task in tasks {
        accepted += task.await.unwrap();
    }
    stop.store(true, Ordering::SeqCst);
    rotator.join().unwrap();

    assert!(accepted > 0);
    assert!(rotating.key_count() <= 4);
}
