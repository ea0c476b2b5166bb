// ==========================================
// 端到端场景测试
// ==========================================
// 创建方案 → 新增两章 → 重排 → 锁定 → 新增被拒 → 删除方案
// ==========================================

mod helpers;

use helpers::api_test_helper::*;
use work_schedule::api::ApiError;
use work_schedule::domain::PlanStatus;

#[test]
fn test_plan_lifecycle_scenario() {
    let env = ApiTestEnv::new().unwrap();
    let schedule = &env.state.schedule_api;
    let hierarchy = &env.state.hierarchy_api;

    let object_id = env.create_object("Central", "Main street 1");
    assert_eq!(object_id, 1);

    let created = schedule.create_work_schedule(object_id).unwrap().data;
    assert_eq!(created.version, 1);
    assert_eq!(created.status, PlanStatus::Editing);
    let p1 = created.plan_id;

    let c1 = env.add_chapter(p1, "Foundations", 1);
    let c2 = env.add_chapter(p1, "Framing", 2);
    assert_eq!(c1.plan_id, p1);
    assert_eq!(c2.number, 2);

    hierarchy
        .reorder_chapters(p1, &[c2.chapter_id, c1.chapter_id])
        .unwrap();
    assert_eq!(hierarchy.get_chapter(c2.chapter_id).unwrap().number, 1);
    assert_eq!(hierarchy.get_chapter(c1.chapter_id).unwrap().number, 2);

    // 添加下级数据, 验证删除时一并清除
    let sub = env.add_subchapter(c1.chapter_id, "Piles", 1);
    let wt = env.add_work_type(sub.subchapter_id, "Concrete", 1, "m3");
    env.add_work_plan(wt.work_type_id, date(2024, 5, 6), 40);

    schedule.lock_plan(p1).unwrap();
    assert_eq!(schedule.get_plan(p1).unwrap().status, PlanStatus::Locked);
    assert!(schedule.is_plan_locked(p1).unwrap().locked);

    let before = env.snapshot();
    let rejected = hierarchy.add_chapter(p1, "Roofing", 3);
    assert!(matches!(rejected, Err(ApiError::PlanLocked(_))));
    assert_eq!(env.snapshot(), before);

    schedule.delete_work_schedule(p1).unwrap();
    assert_not_found(schedule.get_plan_structure(p1));
    for table in ["chapter", "subchapter", "work_type", "work_plan"] {
        assert_eq!(env.count_rows(table), 0, "{} 仍有残留", table);
    }
}

#[test]
fn test_version_handover_scenario() {
    let env = ApiTestEnv::new().unwrap();
    let schedule = &env.state.schedule_api;
    let object_id = env.create_object("North", "Mira 7");

    let v1 = env.create_plan(object_id);
    env.add_chapter(v1, "Earthworks", 1);
    schedule.lock_plan(v1).unwrap();

    let v2 = schedule.create_work_schedule(object_id).unwrap().data;
    assert_eq!(v2.version, 2);

    let current = schedule.get_current_schedule(object_id).unwrap();
    assert_eq!(current.plan.plan_id, v2.plan_id);
    assert!(current.chapters.is_empty());

    // 回到第一版: v2 归档, v1 重新可编辑
    schedule.set_active_plan(v1).unwrap();
    let current = schedule.get_current_schedule(object_id).unwrap();
    assert_eq!(current.plan.plan_id, v1);
    assert_eq!(current.chapters.len(), 1);
    assert_eq!(
        schedule.get_plan(v2.plan_id).unwrap().status,
        PlanStatus::Archived
    );
    assert!(env.state.hierarchy_api.add_chapter(v1, "Utilities", 2).is_ok());
}
