#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Write `content` to `root/rel`, creating parent directories
pub fn write_file(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// Temporary project built from `(relative path, content)` pairs
pub fn project(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (rel, content) in files {
        write_file(dir.path(), rel, content);
    }
    dir
}

/// Next.js app-router project written in TypeScript
pub fn nextjs_project() -> TempDir {
    project(&[
        (
            "package.json",
            r#"{
  "name": "storefront",
  "private": true,
  "dependencies": {
    "next": "^14.2.5",
    "react": "^18.2.0",
    "react-dom": "^18.2.0"
  },
  "devDependencies": {
    "@types/react": "^18.3.3",
    "typescript": "^5.4.5"
  }
}"#,
        ),
        ("next.config.js", "module.exports = {};\n"),
        ("next-env.d.ts", "/// <reference types=\"next\" />\n"),
        ("tsconfig.json", "{ \"compilerOptions\": { \"jsx\": \"preserve\" } }\n"),
        (
            "app/layout.tsx",
            "export default function RootLayout({ children }) {\n  return <html><body>{children}</body></html>;\n}\n",
        ),
        (
            "app/page.tsx",
            "export default function Home() {\n  return <main>Storefront</main>;\n}\n",
        ),
    ])
}

/// Next.js pages-router project in plain JavaScript
pub fn nextjs_pages_project() -> TempDir {
    project(&[
        (
            "package.json",
            r#"{"dependencies": {"next": "13.5.6", "react": "18.2.0", "react-dom": "18.2.0"}}"#,
        ),
        ("next.config.mjs", "export default {};\n"),
        ("pages/_app.js", "export default function App({ Component, pageProps }) {\n  return <Component {...pageProps} />;\n}\n"),
        ("pages/index.js", "export default function Home() {\n  return <h1>Blog</h1>;\n}\n"),
    ])
}

/// React single-page app scaffolded by Vite
pub fn vite_react_project() -> TempDir {
    project(&[
        (
            "package.json",
            r#"{
  "name": "dashboard",
  "private": true,
  "type": "module",
  "dependencies": {
    "react": "^18.3.1",
    "react-dom": "^18.3.1"
  },
  "devDependencies": {
    "@vitejs/plugin-react": "^4.3.1",
    "typescript": "^5.4.5",
    "vite": "^5.3.1"
  }
}"#,
        ),
        ("index.html", "<div id=\"root\"></div>\n<script type=\"module\" src=\"/src/main.tsx\"></script>\n"),
        (
            "vite.config.ts",
            "import { defineConfig } from 'vite';\nimport react from '@vitejs/plugin-react';\nexport default defineConfig({ plugins: [react()] });\n",
        ),
        ("tsconfig.json", "{ \"compilerOptions\": { \"jsx\": \"react-jsx\" } }\n"),
        (
            "src/main.tsx",
            "import { createRoot } from 'react-dom/client';\nimport App from './App';\ncreateRoot(document.getElementById('root')!).render(<App />);\n",
        ),
        ("src/App.tsx", "export default function App() {\n  return <h1>Dashboard</h1>;\n}\n"),
    ])
}

/// Create React App project; components live in .js files
pub fn create_react_app_project() -> TempDir {
    project(&[
        (
            "package.json",
            r#"{"dependencies": {"react": "^18.2.0", "react-dom": "^18.2.0", "react-scripts": "5.0.1"}}"#,
        ),
        ("public/index.html", "<div id=\"root\"></div>\n"),
        (
            "src/index.js",
            "import ReactDOM from 'react-dom/client';\nimport App from './App';\nReactDOM.createRoot(document.getElementById('root')).render(<App />);\n",
        ),
        ("src/App.js", "export default function App() {\n  return <p>Hello</p>;\n}\n"),
    ])
}

/// Vue 3 app on Vite
pub fn vue_project() -> TempDir {
    project(&[
        (
            "package.json",
            r#"{"dependencies": {"vue": "^3.4.27"}, "devDependencies": {"@vitejs/plugin-vue": "^5.0.5", "vite": "^5.3.1"}}"#,
        ),
        ("index.html", "<div id=\"app\"></div>\n"),
        ("vite.config.js", "import vue from '@vitejs/plugin-vue';\nexport default { plugins: [vue()] };\n"),
        ("src/main.js", "import { createApp } from 'vue';\nimport App from './App.vue';\ncreateApp(App).mount('#app');\n"),
        ("src/App.vue", "<template><h1>Hello</h1></template>\n"),
    ])
}

pub fn express_project() -> TempDir {
    project(&[
        ("package.json", r#"{"dependencies": {"express": "^4.19.2"}}"#),
        (
            "src/server.js",
            "const express = require('express');\nconst app = express();\napp.listen(3000);\n",
        ),
    ])
}

/// Only the manifest: fastapi and uvicorn pinned, no sources
pub fn fastapi_project() -> TempDir {
    project(&[(
        "requirements.txt",
        "fastapi==0.109.2\nuvicorn[standard]==0.27.0\n",
    )])
}

/// FastAPI service with its application module
pub fn fastapi_app_project() -> TempDir {
    project(&[
        ("requirements.txt", "fastapi==0.110.0\nuvicorn[standard]==0.29.0\npydantic==2.7.1\n"),
        (
            "app/main.py",
            "from fastapi import FastAPI\n\napp = FastAPI()\n\n\n@app.get(\"/health\")\ndef health():\n    return {\"ok\": True}\n",
        ),
    ])
}

pub fn flask_project() -> TempDir {
    project(&[
        ("requirements.txt", "Flask==3.0.3\ngunicorn==22.0.0\n"),
        (
            "app.py",
            "from flask import Flask\n\napp = Flask(__name__)\n\n\n@app.route(\"/\")\ndef index():\n    return \"ok\"\n",
        ),
    ])
}

pub fn django_project() -> TempDir {
    project(&[
        ("requirements.txt", "Django==5.0.6\npsycopg[binary]==3.1.19\n"),
        ("manage.py", "#!/usr/bin/env python\nimport os\nimport sys\n"),
        (
            "config/settings.py",
            "INSTALLED_APPS = [\n    \"django.contrib.admin\",\n    \"django.contrib.auth\",\n]\n",
        ),
    ])
}

pub fn gin_project() -> TempDir {
    project(&[
        (
            "go.mod",
            "module example.com/api\n\ngo 1.22\n\nrequire github.com/gin-gonic/gin v1.10.0\n",
        ),
        (
            "main.go",
            "package main\n\nimport \"github.com/gin-gonic/gin\"\n\nfunc main() {\n\tr := gin.Default()\n\tr.Run()\n}\n",
        ),
    ])
}

pub fn rails_project() -> TempDir {
    project(&[
        ("Gemfile", "source 'https://rubygems.org'\ngem 'rails', '~> 7.1.3'\ngem 'puma'\n"),
        ("config/routes.rb", "Rails.application.routes.draw do\nend\n"),
        ("bin/rails", "#!/usr/bin/env ruby\n"),
    ])
}

pub fn laravel_project() -> TempDir {
    project(&[
        ("composer.json", r#"{"require": {"php": "^8.2", "laravel/framework": "^11.9"}}"#),
        ("artisan", "#!/usr/bin/env php\n<?php\n"),
        ("routes/web.php", "<?php\n\nuse Illuminate\\Support\\Facades\\Route;\n"),
    ])
}

pub fn spring_boot_project() -> TempDir {
    project(&[
        (
            "pom.xml",
            r#"<?xml version="1.0"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
  <dependencies>
    <dependency>
      <groupId>org.springframework.boot</groupId>
      <artifactId>spring-boot-starter-web</artifactId>
    </dependency>
  </dependencies>
</project>
"#,
        ),
        (
            "src/main/java/com/example/Application.java",
            "package com.example;\n\n@SpringBootApplication\npublic class Application {}\n",
        ),
        ("src/main/resources/application.properties", "server.port=8080\n"),
    ])
}

pub fn flutter_project() -> TempDir {
    project(&[
        (
            "pubspec.yaml",
            "name: app\nenvironment:\n  sdk: '>=3.3.0 <4.0.0'\ndependencies:\n  flutter:\n    sdk: flutter\n",
        ),
        ("lib/main.dart", "import 'package:flutter/material.dart';\n\nvoid main() {}\n"),
    ])
}

pub fn axum_project() -> TempDir {
    project(&[
        ("Cargo.toml", "[package]\nname = \"api\"\nversion = \"0.1.0\"\n\n[dependencies]\naxum = \"0.7.5\"\n"),
        (
            "src/main.rs",
            "use axum::routing::get;\n\nfn main() {\n    let _app = axum::Router::<()>::new().route(\"/\", get(|| async {}));\n}\n",
        ),
    ])
}

/// Tests, CI and a README, but no recognisable framework
pub fn scala_mvp_project() -> TempDir {
    project(&[
        ("build.sbt", "scalaVersion := \"3.3.1\"\n"),
        ("tests/test_app.py", "def test_ok():\n    assert True\n"),
        (
            ".github/workflows/ci.yml",
            "name: ci\non: [push]\njobs:\n  test:\n    runs-on: ubuntu-latest\n",
        ),
        ("README.md", "# Service\n"),
    ])
}

/// Path of the `stackprobe` binary built for integration tests
pub fn stackprobe_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_stackprobe"))
}
