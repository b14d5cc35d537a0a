// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 assetflow contributors

//! Built-in task table
//!
//! | task | reads | writes |
//! |---|---|---|
//! | `copy-html` | `src/*.html` | `dist/` |
//! | `build-sass` | `src/assets/sass/style.scss` | `dist/style.css` |
//! | `build-js` | `src/assets/js/main.js` | `dist/script.js` |
//! | `imagemin` | `src/assets/img/**/*.*` | `dist/assets/img/` |
//! | `iconsmin` | `src/assets/icons/**/*.*` | `dist/assets/icons/` |
//! | `webp` | `src/assets/img/**/*.*` | `src/assets/img/`, `dist/assets/img/` |
//! | `svg-sprite` | `src/assets/svg/**/*.svg` | `sprite.svg` in both image dirs |
//! | `svg-css` | `src/assets/svg/**/*.svg` | `src/assets/sass/global/__svg.scss` |
//!
//! plus the compositions `build`, `watch`, `prod` and `default`.

use async_trait::async_trait;
use futures::future::join_all;
use std::path::PathBuf;
use std::time::Duration;

use crate::assets::{AssetPipeline, ChangedFilter, Destination};
use crate::config::{ProjectConfig, ServerConfig};
use crate::errors::AssetflowResult;
use crate::pipeline::{ReloadPolicy, Task, TaskAction, TaskContext, TaskName, TaskRegistry, TaskReport};
use crate::server::DevServer;
use crate::stages::{
    Bundle, BundleMode, CssOptimize, HtmlMinify, ImageMin, SassCompile, SvgCss, SvgMinify, SvgSprite,
    WebpConvert,
};
use crate::watch::watch;

/// Tasks every project gets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinTask {
    CopyHtml,
    BuildSass,
    BuildJs,
    ImageMin,
    IconsMin,
    Webp,
    SvgSprite,
    SvgCss,
    Build,
    Watch,
    Prod,
    Default,
}

impl BuiltinTask {
    /// Registration order; dependencies come before their dependents
    pub const ALL: [BuiltinTask; 12] = [
        Self::CopyHtml,
        Self::BuildSass,
        Self::BuildJs,
        Self::ImageMin,
        Self::IconsMin,
        Self::Webp,
        Self::SvgSprite,
        Self::SvgCss,
        Self::Build,
        Self::Watch,
        Self::Prod,
        Self::Default,
    ];

    /// Leaves built by `build` and by the initial pass of `watch`
    pub const BUILD_LEAVES: [BuiltinTask; 3] = [Self::CopyHtml, Self::BuildJs, Self::BuildSass];

    pub fn name(&self) -> &'static str {
        match self {
            Self::CopyHtml => "copy-html",
            Self::BuildSass => "build-sass",
            Self::BuildJs => "build-js",
            Self::ImageMin => "imagemin",
            Self::IconsMin => "iconsmin",
            Self::Webp => "webp",
            Self::SvgSprite => "svg-sprite",
            Self::SvgCss => "svg-css",
            Self::Build => "build",
            Self::Watch => "watch",
            Self::Prod => "prod",
            Self::Default => "default",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::CopyHtml => "Minify the HTML pages into dist",
            Self::BuildSass => "Compile the main stylesheet",
            Self::BuildJs => "Bundle the main script with a source map",
            Self::ImageMin => "Optimize images",
            Self::IconsMin => "Optimize icons",
            Self::Webp => "Create WebP copies of new or changed images",
            Self::SvgSprite => "Stack the SVG icons into sprite.svg",
            Self::SvgCss => "Generate the SVG custom property partial",
            Self::Build => "Run copy-html, build-js and build-sass in parallel",
            Self::Watch => "Build copy-html, build-js and build-sass, then serve dist with live reload and rebuild on change",
            Self::Prod => "Build minified, prefixed CSS and production JS",
            Self::Default => "Run watch and build in parallel",
        }
    }

    fn leaves() -> Vec<TaskName> {
        Self::BUILD_LEAVES.iter().map(|t| t.name().to_string()).collect()
    }

    fn task(self, config: &ProjectConfig) -> Task {
        let task = Task::new(self.name()).describe(self.description());
        let dist = || Destination::new(config.dist_dir(""));
        let image_dirs = || Destination::multi([config.src_dir("assets/img"), config.dist_dir("assets/img")]);

        match self {
            Self::CopyHtml => task
                .action(
                    AssetPipeline::from_glob(config.src_glob("*.html"))
                        .pipe(HtmlMinify::default())
                        .dest(dist()),
                )
                .reload(ReloadPolicy::Reload),
            Self::BuildSass => task
                .action(
                    AssetPipeline::from_glob(config.src_glob("assets/sass/style.scss"))
                        .pipe(SassCompile::new())
                        .dest(dist()),
                )
                .reload(ReloadPolicy::Inject),
            Self::BuildJs => task
                .action(
                    AssetPipeline::from_glob(config.src_glob("assets/js/main.js"))
                        .pipe(bundle(config, BundleMode::Development))
                        .dest(dist()),
                )
                .reload(ReloadPolicy::Reload),
            Self::ImageMin => task.action(
                AssetPipeline::from_glob(config.src_glob("assets/img/**/*.*"))
                    .pipe(ImageMin::new(config.images.jpeg_quality))
                    .dest(Destination::new(config.dist_dir("assets/img"))),
            ),
            Self::IconsMin => task.action(
                AssetPipeline::from_glob(config.src_glob("assets/icons/**/*.*"))
                    .pipe(ImageMin::new(config.images.icon_jpeg_quality))
                    .dest(Destination::new(config.dist_dir("assets/icons"))),
            ),
            Self::Webp => task.action(
                AssetPipeline::from_glob(config.src_glob("assets/img/**/*.*"))
                    .skip_unchanged(ChangedFilter::new(config.dist_dir("assets/img")).with_extension("webp"))
                    .pipe(WebpConvert)
                    .dest(image_dirs()),
            ),
            Self::SvgSprite => task.action(
                AssetPipeline::from_glob(config.src_glob("assets/svg/**/*.svg"))
                    .pipe(SvgMinify)
                    .pipe(SvgSprite::default())
                    .dest(image_dirs()),
            ),
            Self::SvgCss => task.action(
                AssetPipeline::from_glob(config.src_glob("assets/svg/**/*.svg"))
                    .pipe(SvgMinify)
                    .pipe(SvgCss::default())
                    .dest(Destination::new(config.src_dir("assets/sass/global"))),
            ),
            Self::Build => task.parallel(Self::leaves()),
            Self::Watch => task.action(ServeAndWatch {
                dist: config.dist.clone(),
                server: config.server.clone(),
                debounce: Duration::from_millis(config.watch.debounce_ms),
                initial: Self::leaves(),
            }),
            Self::Prod => task.action(ProdBuild {
                css: AssetPipeline::from_glob(config.src_glob("assets/sass/style.scss"))
                    .pipe(SassCompile::new().compressed())
                    .pipe(CssOptimize::default())
                    .dest(dist()),
                js: AssetPipeline::from_glob(config.src_glob("assets/js/main.js"))
                    .pipe(bundle(config, BundleMode::Production))
                    .dest(dist()),
            }),
            Self::Default => task.parallel([Self::Watch.name(), Self::Build.name()]),
        }
    }
}

fn bundle(config: &ProjectConfig, mode: BundleMode) -> Bundle {
    Bundle::new(&config.bundler.program, mode)
        .target(&config.bundler.target)
        .output(&config.bundler.output)
}

/// Register the built-in tasks and watch bindings
pub fn register_builtin(registry: &mut TaskRegistry, config: &ProjectConfig) -> AssetflowResult<()> {
    for builtin in BuiltinTask::ALL {
        registry.register(builtin.task(config))?;
    }

    registry.watch(&config.src_glob("*.html"), [BuiltinTask::CopyHtml.name()])?;
    registry.watch(&config.src_glob("assets/js/**/*.js"), [BuiltinTask::BuildJs.name()])?;
    registry.watch(&config.src_glob("assets/sass/**/*.scss"), [BuiltinTask::BuildSass.name()])?;
    registry.watch(&config.src_glob("assets/img/**/*.*"), [BuiltinTask::ImageMin.name()])?;
    registry.watch(&config.src_glob("assets/img/**/*.*"), [BuiltinTask::Webp.name()])?;
    registry.watch(&config.src_glob("assets/icons/**/*.*"), [BuiltinTask::IconsMin.name()])?;

    Ok(())
}

/// Dev server plus watcher, after an initial build of the leaves
///
/// A failing initial build is reported and does not stop the server.
struct ServeAndWatch {
    dist: PathBuf,
    server: ServerConfig,
    debounce: Duration,
    initial: Vec<TaskName>,
}

#[async_trait]
impl TaskAction for ServeAndWatch {
    async fn run(&self, ctx: &TaskContext) -> AssetflowResult<TaskReport> {
        let runner = ctx.runner().clone();
        let server = DevServer::new(
            ctx.root().join(&self.dist),
            self.server.port,
            runner.live_reload().clone(),
        )
        .with_notify(self.server.notify);

        let initial = async {
            let outcomes = join_all(self.initial.iter().map(|name| ctx.run_in_session(name))).await;
            for (name, outcome) in self.initial.iter().zip(outcomes) {
                if let Err(e) = outcome {
                    tracing::warn!("Initial build of '{}' failed: {}", name, e);
                }
            }
        };

        let set = runner.registry().watch_set();
        let serving = async { tokio::try_join!(server.serve(), watch(runner.clone(), set, self.debounce)) };

        let ((), result) = tokio::join!(initial, serving);
        result?;
        Ok(TaskReport::default())
    }
}

/// Production CSS and JS, both awaited
struct ProdBuild {
    css: AssetPipeline,
    js: AssetPipeline,
}

#[async_trait]
impl TaskAction for ProdBuild {
    async fn run(&self, ctx: &TaskContext) -> AssetflowResult<TaskReport> {
        let (css, js) = tokio::join!(
            self.css.process(ctx.task(), ctx.root()),
            self.js.process(ctx.task(), ctx.root())
        );

        let mut report = css?;
        report.merge(js?);
        Ok(report)
    }

    fn destinations(&self) -> Vec<PathBuf> {
        let mut dirs = self.css.destinations();
        dirs.extend(self.js.destinations());
        dirs.dedup();
        dirs
    }

    fn sources(&self) -> Vec<String> {
        let mut sources = self.css.sources();
        sources.extend(self.js.sources());
        sources
    }
}
