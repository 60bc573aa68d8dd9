// 该文件是 Qiuhao （明察秋毫） 项目的一部分。
// src/nms.rs - 非极大值抑制
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use std::cmp::Ordering;

use crate::pipeline::Detection;

/// 计算两个边界框的交并比，面积由调用方预先算好
///
/// 并集面积为零（两个重合的零面积框）时返回 0，即不抑制
fn iou(a: &[f32; 4], b: &[f32; 4], area_a: f32, area_b: f32) -> f32 {
  let x0 = a[0].max(b[0]);
  let y0 = a[1].max(b[1]);
  let x1 = a[2].min(b[2]);
  let y1 = a[3].min(b[3]);

  let intersection = (x1 - x0).max(0.0) * (y1 - y0).max(0.0);
  let union = area_a + area_b - intersection;

  if union > 0.0 {
    intersection / union
  } else {
    0.0
  }
}

/// 贪心非极大值抑制
///
/// 下标按得分升序稳定排序（得分相同保持插入顺序），每轮弹出得分最高的
/// 下标并保留，再剔除与其 IOU 严格大于阈值的其余下标。返回保留下标，
/// 按弹出顺序排列，即得分最高者在前。
pub fn non_max_suppression(detections: &[Detection], iou_threshold: f32) -> Vec<usize> {
  if detections.is_empty() {
    return Vec::new();
  }

  let areas: Vec<f32> = detections
    .iter()
    .map(|d| (d.bbox[2] - d.bbox[0]) * (d.bbox[3] - d.bbox[1]))
    .collect();

  let mut order: Vec<usize> = (0..detections.len()).collect();
  order.sort_by(|&a, &b| {
    detections[a]
      .score
      .partial_cmp(&detections[b].score)
      .unwrap_or(Ordering::Equal)
  });

  let mut keep = Vec::new();
  while let Some(selected) = order.pop() {
    keep.push(selected);

    let bbox = &detections[selected].bbox;
    let area = areas[selected];
    order.retain(|&other| iou(bbox, &detections[other].bbox, area, areas[other]) <= iou_threshold);
  }

  keep
}
