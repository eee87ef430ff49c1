//! Join-code allocation.
//!
//! Codes are random and short, so two campaigns can collide. The
//! `campaigns` table carries a unique constraint on the code, an insert
//! that trips it simply runs again with a fresh code, up to a bound.
use futures::future::BoxFuture;
use ring::rand::{SecureRandom, SystemRandom};

use crate::error::AppError;

pub const CODE_LENGTH: usize = 10;
pub const MAX_ATTEMPTS: u32 = 30;

/// Eight random bytes encode to eleven URL-safe characters, one more
/// than a code needs.
pub fn generate() -> Result<String, AppError> {
    let mut bytes = [0_u8; 8];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| unexpected!("The system random source failed"))?;
    let mut code = base64::encode_config(bytes, base64::URL_SAFE_NO_PAD);
    code.truncate(CODE_LENGTH);
    Ok(code)
}

/// Feeds fresh codes to `attempt` until one sticks.
///
/// `Ok(None)` from an attempt means the code collided with an existing
/// campaign and another one should be tried. After `MAX_ATTEMPTS`
/// collisions the allocation gives up with a distinct error, it never
/// hands out a code that is already taken.
pub async fn allocate<D, T, F>(db: &mut D, mut attempt: F) -> Result<T, AppError>
where
    D: Send,
    F: for<'a> FnMut(&'a mut D, String) -> BoxFuture<'a, Result<Option<T>, AppError>> + Send,
{
    for _ in 0..MAX_ATTEMPTS {
        if let Some(value) = attempt(db, generate()?).await? {
            return Ok(value);
        }
    }
    log::warn!("Join-code allocation gave up after {} collisions", MAX_ATTEMPTS);
    Err(AppError::CodeExhausted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::JOIN_CODE;
    use futures::FutureExt;

    #[test]
    fn generated_codes_are_short_and_url_safe() {
        for _ in 0..64 {
            let code = generate().unwrap();
            assert_eq!(code.len(), CODE_LENGTH);
            assert!(JOIN_CODE.run(&code).is_ok(), "bad code: {}", code);
        }
    }

    #[tokio::test]
    async fn the_first_non_colliding_code_wins() {
        let mut attempts = 0_u32;
        let code = allocate(&mut attempts, |attempts, code| {
            async move {
                *attempts += 1;
                if *attempts < 3 {
                    Ok(None)
                } else {
                    Ok(Some(code))
                }
            }
            .boxed()
        })
        .await
        .unwrap();
        assert_eq!(attempts, 3);
        assert_eq!(code.len(), CODE_LENGTH);
    }

    #[tokio::test]
    async fn exhausted_allocation_fails_distinctly() {
        let mut attempts = 0_u32;
        let result: Result<String, AppError> = allocate(&mut attempts, |attempts, _code| {
            async move {
                *attempts += 1;
                Ok(None)
            }
            .boxed()
        })
        .await;
        assert!(matches!(result, Err(AppError::CodeExhausted)));
        assert_eq!(attempts, MAX_ATTEMPTS);
    }

    #[tokio::test]
    async fn attempt_errors_are_not_retried() {
        let mut attempts = 0_u32;
        let result: Result<String, AppError> = allocate(&mut attempts, |attempts, _code| {
            async move {
                *attempts += 1;
                Err(AppError::NotFound("Campaign"))
            }
            .boxed()
        })
        .await;
        assert!(matches!(result, Err(AppError::NotFound("Campaign"))));
        assert_eq!(attempts, 1);
    }
}
