// 该文件是 Qiuhao （明察秋毫） 项目的一部分。
// src/main.rs - 项目主程序
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

mod args;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use qiuhao::config::{self, PipelineConfig};
use qiuhao::detector::TemplateDetector;
use qiuhao::labels::LabelMap;
use qiuhao::output::create_output_writer;
use qiuhao::pipeline::Pipeline;

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = args::Args::parse();

  info!("Qiuhao 瓦片化小目标检测");
  info!("输入图片: {}", args.input);
  info!("模板目录: {}", args.templates);
  info!("瓦片尺寸: {}", args.tile_sizes);
  info!("瓦片重叠: {}", args.tile_overlap);
  info!("置信度阈值: {}", args.score_threshold);
  info!("IOU 阈值: {}", args.iou_threshold);

  // 读取输入图片
  let image = image::ImageReader::open(&args.input)
    .with_context(|| format!("无法打开输入图片: {}", args.input))?
    .decode()
    .with_context(|| format!("无法解码输入图片: {}", args.input))?
    .to_rgb8();
  info!("图片尺寸: {}x{}", image.width(), image.height());

  // 创建检测器与标签映射
  let detector = TemplateDetector::from_dir(&args.templates)?;
  let labels = match &args.label {
    Some(path) => {
      LabelMap::from_file(path).with_context(|| format!("无法读取标签文件: {}", path))?
    }
    None => detector.label_map(),
  };

  let pipeline = Pipeline::new(
    PipelineConfig {
      tile_sizes: config::parse_tile_sizes(&args.tile_sizes)?,
      tile_overlap: args.tile_overlap,
      score_threshold: args.score_threshold,
      iou_threshold: args.iou_threshold,
    },
    detector,
    labels,
  )?;

  // 运行检测
  info!("开始检测...");
  let now = std::time::Instant::now();
  let detections = pipeline.process(&image)?;
  info!(
    "检测完成，耗时: {:.2?}, 保留 {} 个目标",
    now.elapsed(),
    detections.len()
  );

  // 输出检测结果
  for det in &detections {
    info!(
      "  - {}: {:.2}% at ({:.0}, {:.0}, {:.0}, {:.0})",
      det.label,
      det.score * 100.0,
      det.bbox[0],
      det.bbox[1],
      det.bbox[2],
      det.bbox[3]
    );
  }

  // 写出标注图和检测记录
  for path in [args.output.as_deref(), args.record.as_deref()]
    .into_iter()
    .flatten()
  {
    let mut writer = create_output_writer(path)?;
    writer.write(&image, &detections)?;
    writer.finish()?;
    info!("结果已写出: {}", path);
  }

  Ok(())
}
