//! Initialize a new portfolio site

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::Folio;

const DEFAULT_CONFIG: &str = r#"# Portfolio Configuration

# Site
title: Portfolio
subtitle: ''
description: ''
author: John Doe
language: en

# URL
url: http://example.com

# Directory
content_dir: content
public_dir: public
i18n_dir: languages

# Content categories, in display order
categories:
  - name: skills
  - name: education
  - name: experience
  - name: projects
  - name: testimonials
  - name: guestbook
    public: false
  - name: blog

# Back office
admin:
  # token: change-me
  renormalize_on_delete: false

# Chat widget
chat:
  fallback: I'm not sure about that. Try asking about skills, projects or experience.
  rules:
    - keywords: [contact, email, reach]
      reply: The best way to reach me is through the contact form.
"#;

const DEFAULT_LANGUAGE: &str = r#"sections:
  skills: Skills
  education: Education
  experience: Experience
  projects: Projects
  testimonials: Testimonials
  guestbook: Guestbook
  blog: Blog
"#;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    let config_path = target_dir.join("_config.yml");
    if config_path.exists() {
        anyhow::bail!("Site already initialized: {:?}", config_path);
    }

    fs::create_dir_all(target_dir.join("content"))?;
    fs::create_dir_all(target_dir.join("languages"))?;

    fs::write(&config_path, DEFAULT_CONFIG)?;
    fs::write(target_dir.join("languages/en.yml"), DEFAULT_LANGUAGE)?;

    // Seed a couple of categories so the admin has something to reorder
    let year = chrono::Local::now().format("%Y");
    let skills = r#"- id: rust
  order: 0
  title: Rust
  level: advanced
- id: typescript
  order: 1
  title: TypeScript
  level: advanced
- id: sql
  order: 2
  title: SQL
  level: intermediate
"#;
    let projects = format!(
        r#"- id: portfolio
  order: 0
  title: Portfolio
  description: This site, managed with folio-rs.
  start: '{}'
"#,
        year
    );

    fs::write(target_dir.join("content/skills.yml"), skills)?;
    fs::write(target_dir.join("content/projects.yml"), projects)?;

    Ok(())
}

/// Run the init command with an existing instance
pub fn run(folio: &Folio) -> Result<()> {
    init_site(&folio.base_dir)
}
