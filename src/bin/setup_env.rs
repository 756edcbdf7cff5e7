// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Create `.env` from `env.template` with a fresh JWT secret.

use anyhow::{bail, Context};
use ring::rand::{SecureRandom, SystemRandom};
use std::path::Path;

const ENV_PATH: &str = ".env";
const TEMPLATE_PATH: &str = "env.template";
const SECRET_BYTES: usize = 32;

fn main() -> anyhow::Result<()> {
    let env_path = Path::new(ENV_PATH);
    if env_path.exists() {
        println!("⚠️  .env file already exists. Skipping creation.");
        println!("   If you want to recreate it, delete .env first.");
        return Ok(());
    }

    let template_path = Path::new(TEMPLATE_PATH);
    if !template_path.exists() {
        bail!("{TEMPLATE_PATH} file not found");
    }

    let template = std::fs::read_to_string(template_path)
        .with_context(|| format!("reading {TEMPLATE_PATH}"))?;
    let secret = generate_secret()?;

    std::fs::write(env_path, with_jwt_secret(&template, &secret))
        .with_context(|| format!("writing {ENV_PATH}"))?;

    println!("✅ .env file created successfully!");
    println!();
    println!("📝 Next steps:");
    println!("   1. Edit .env and add your MySQL credentials");
    println!("   2. Add your Google OAuth credentials");
    println!("   3. Run: cargo run --bin bmi-tracker");
    Ok(())
}

/// 32 random bytes, hex encoded.
fn generate_secret() -> anyhow::Result<String> {
    let mut bytes = [0u8; SECRET_BYTES];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| anyhow::anyhow!("system random number generator failed"))?;
    Ok(hex::encode(bytes))
}

/// Replace the `JWT_SECRET=` line, or append one if the template lacks it.
fn with_jwt_secret(template: &str, secret: &str) -> String {
    let mut replaced = false;
    let mut lines: Vec<String> = template
        .lines()
        .map(|line| {
            if !replaced && line.starts_with("JWT_SECRET=") {
                replaced = true;
                format!("JWT_SECRET={secret}")
            } else {
                line.to_string()
            }
        })
        .collect();

    if !replaced {
        lines.push(format!("JWT_SECRET={secret}"));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_is_64_hex_chars() {
        let secret = generate_secret().unwrap();
        assert_eq!(secret.len(), 64);
        assert!(secret.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(secret, generate_secret().unwrap());
    }

    #[test]
    fn test_replaces_existing_line() {
        let template = "DB_HOST=localhost\nJWT_SECRET=change-me\nPORT=3000\n";
        assert_eq!(
            with_jwt_secret(template, "abc"),
            "DB_HOST=localhost\nJWT_SECRET=abc\nPORT=3000\n"
        );
    }

    #[test]
    fn test_appends_when_missing() {
        assert_eq!(with_jwt_secret("PORT=3000", "abc"), "PORT=3000\nJWT_SECRET=abc\n");
    }
}
