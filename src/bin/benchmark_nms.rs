// 该文件是 Qiuhao （明察秋毫） 项目的一部分。
// src/bin/benchmark_nms.rs - 非极大值抑制基准测试
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};

use qiuhao::nms::non_max_suppression;
use qiuhao::pipeline::Detection;

/// 非极大值抑制基准测试参数
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 合成检测框数量
  #[arg(long, default_value = "2000", value_name = "COUNT")]
  pub boxes: usize,

  /// 重复轮数
  #[arg(long, default_value = "50", value_name = "COUNT")]
  pub rounds: usize,

  /// NMS IOU 阈值
  #[arg(long, default_value = "0.1", value_name = "THRESHOLD")]
  pub iou_threshold: f32,
}

/// 确定性地合成一批检测框，模拟瓦片边界附近成簇的重复检测
fn synthesize(count: usize) -> Vec<Detection> {
  let mut out = Vec::with_capacity(count);
  let mut state: u64 = 0x9E37_79B9_7F4A_7C15;

  for i in 0..count {
    state ^= state << 13;
    state ^= state >> 7;
    state ^= state << 17;

    let x = (state % 3840) as f32;
    let y = ((state >> 12) % 2160) as f32;
    let w = 16.0 + ((state >> 24) % 48) as f32;
    let h = 16.0 + ((state >> 32) % 48) as f32;
    let score = ((state >> 40) % 1000) as f32 / 1000.0;

    out.push(Detection {
      class_id: (i % 8) as u32,
      label: (i % 8).to_string(),
      score,
      bbox: [x, y, x + w, y + h],
    });
  }

  out
}

fn main() {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("检测框数量: {}", args.boxes);
  info!("重复轮数: {}", args.rounds);
  info!("IOU 阈值: {}", args.iou_threshold);

  let detections = synthesize(args.boxes);

  let mut times = Vec::with_capacity(args.rounds);
  for i in 0..args.rounds {
    let now = std::time::Instant::now();
    let keep = non_max_suppression(&detections, args.iou_threshold);
    let elapsed = now.elapsed();
    info!("({}) 抑制完成，保留 {} 个，耗时: {:.2?}", i, keep.len(), elapsed);
    times.push(elapsed);
  }

  let settled = times.iter().skip(2).sum::<Duration>();
  let rounds = times.len().saturating_sub(2).max(1);
  warn!("平均抑制时间: {:.2?}", settled / rounds as u32);
}
