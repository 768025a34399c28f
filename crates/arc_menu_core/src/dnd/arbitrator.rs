use std::rc::Rc;
use std::time::Duration;

use log::debug;
use uuid::Uuid;

use crate::data::request::{prepare_drop_request, RequestKind};
use crate::dnd::clock::{Clock, SystemClock};
use crate::dnd::effect::{resolve_drop_effect, DragModifiers, DropEffect, Platform};
use crate::dnd::hover_timer::HoverTimer;
use crate::dnd::payload::{DragPayload, PayloadKind, TYPE_REQUEST_OBJECT};
use crate::dnd::DEFAULT_DRAG_OPEN_TIMEOUT_MS;
use crate::selection::MenuPanel;
use crate::store::mutation::MutationRequest;
use crate::store::RequestOrigin;

/// Something a drag can hover and drop on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DropTarget {
    /// A tab of the tabbed menu.
    Tab(MenuPanel),
    /// The saved requests list.
    SavedList,
    /// A project row in the projects list.
    ProjectRow { project_id: String },
    /// An insertion slot in an opened project's request list.
    RequestList { project_id: String, index: usize },
    /// An insertion slot in the projects list itself.
    ProjectOrder { index: usize },
}

/// Which target kinds a widget exposes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DropCapabilities {
    pub tabs: bool,
    pub saved_list: bool,
    pub project_rows: bool,
    pub request_lists: bool,
    pub project_order: bool,
}

impl DropCapabilities {
    pub fn tab_container() -> Self {
        DropCapabilities {
            tabs: true,
            ..Default::default()
        }
    }

    pub fn projects_menu() -> Self {
        DropCapabilities {
            project_rows: true,
            request_lists: true,
            project_order: true,
            ..Default::default()
        }
    }

    pub fn saved_menu() -> Self {
        DropCapabilities {
            saved_list: true,
            ..Default::default()
        }
    }

    fn supports(&self, target: &DropTarget) -> bool {
        match target {
            DropTarget::Tab(_) => self.tabs,
            DropTarget::SavedList => self.saved_list,
            DropTarget::ProjectRow { .. } => self.project_rows,
            DropTarget::RequestList { .. } => self.request_lists,
            DropTarget::ProjectOrder { .. } => self.project_order,
        }
    }
}

/// Questions the arbitrator asks the widget that owns it.
pub trait DropHost {
    fn selected_panel(&self) -> Option<MenuPanel> {
        None
    }

    fn is_project_open(&self, _project_id: &str) -> bool {
        false
    }

    fn project_contains(&self, _project_id: &str, _request_id: &str) -> bool {
        false
    }
}

/// Host with nothing selected, opened or cached.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHost;

impl DropHost for NoHost {}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DragOverOutcome {
    pub accept: bool,
    pub timer_armed: bool,
    pub effect: Option<DropEffect>,
}

impl DragOverOutcome {
    fn rejected() -> Self {
        Self::default()
    }
}

/// Decides what a drag may do over the targets of one widget.
#[derive(Debug)]
pub struct DropArbitrator {
    enabled: bool,
    capabilities: DropCapabilities,
    delay: Duration,
    platform: Platform,
    clock: Rc<dyn Clock>,
    timer: HoverTimer<DropTarget>,
    affordance: Option<DropTarget>,
}

impl DropArbitrator {
    pub fn new(capabilities: DropCapabilities) -> Self {
        DropArbitrator {
            enabled: true,
            capabilities,
            delay: Duration::from_millis(DEFAULT_DRAG_OPEN_TIMEOUT_MS),
            platform: Platform::current(),
            clock: Rc::new(SystemClock::new()),
            timer: HoverTimer::default(),
            affordance: None,
        }
    }

    pub fn with_clock(mut self, clock: Rc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Disabling drops any pending hover and highlight.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.timer.cancel();
            self.affordance = None;
        }
    }

    /// The target currently drawn as a drop target.
    pub fn affordance(&self) -> Option<&DropTarget> {
        self.affordance.as_ref()
    }

    pub fn pending(&self) -> Option<&DropTarget> {
        self.timer.target()
    }

    /// Time until the pending hover fires, for repaint scheduling.
    pub fn remaining(&self) -> Option<Duration> {
        self.timer.remaining(self.clock.now())
    }

    fn effect(&self, payload: &DragPayload, modifiers: DragModifiers) -> DropEffect {
        resolve_drop_effect(
            modifiers.command_held(self.platform),
            payload.effect_allowed,
            payload.is_history_origin(),
        )
    }

    fn check(
        &self,
        target: &DropTarget,
        payload: &DragPayload,
        host: &dyn DropHost,
    ) -> Result<PayloadKind, &'static str> {
        if !self.enabled {
            return Err("drag and drop is disabled");
        }
        let kind = payload.kind().ok_or("payload kind is not recognized")?;
        if !self.capabilities.supports(target) {
            return Err("target kind is not offered here");
        }
        match (kind, target) {
            (PayloadKind::Request, DropTarget::Tab(panel)) => {
                if !panel.opens_on_drag() {
                    Err("tab is not a drop destination")
                } else if host.selected_panel() == Some(*panel) {
                    Err("tab is already selected")
                } else {
                    Ok(kind)
                }
            }
            (PayloadKind::Request, DropTarget::SavedList) => {
                if payload.is_history_origin() && payload.has_type(TYPE_REQUEST_OBJECT) {
                    Ok(kind)
                } else {
                    Err("request is already saved")
                }
            }
            (PayloadKind::Request, DropTarget::ProjectRow { project_id }) => {
                if payload.owner_project_id() == Some(project_id.as_str()) {
                    return Err("request already belongs to the project");
                }
                let contained = !payload.is_history_origin()
                    && payload
                        .id()
                        .map_or(false, |id| host.project_contains(project_id, &id));
                if contained {
                    Err("request already belongs to the project")
                } else {
                    Ok(kind)
                }
            }
            (PayloadKind::Request, DropTarget::RequestList { .. }) => Ok(kind),
            (PayloadKind::Project, DropTarget::ProjectOrder { .. }) => Ok(kind),
            _ => Err("target does not take this payload kind"),
        }
    }

    fn opens_on_hover(target: &DropTarget, host: &dyn DropHost) -> bool {
        match target {
            DropTarget::Tab(_) => true,
            DropTarget::ProjectRow { project_id } => !host.is_project_open(project_id),
            _ => false,
        }
    }

    pub fn drag_over(
        &mut self,
        target: &DropTarget,
        payload: &DragPayload,
        modifiers: DragModifiers,
        host: &dyn DropHost,
    ) -> DragOverOutcome {
        if let Err(reason) = self.check(target, payload, host) {
            debug!("drag over {:?} rejected: {}", target, reason);
            if self.affordance.as_ref() == Some(target) {
                self.affordance = None;
            }
            return DragOverOutcome::rejected();
        }
        self.affordance = Some(target.clone());
        if Self::opens_on_hover(target, host) {
            self.timer.arm(target.clone(), self.delay, self.clock.now());
        }
        DragOverOutcome {
            accept: true,
            timer_armed: self.timer.target() == Some(target),
            effect: Some(self.effect(payload, modifiers)),
        }
    }

    pub fn drag_leave(&mut self, target: &DropTarget) {
        self.timer.cancel_for(target);
        if self.affordance.as_ref() == Some(target) {
            self.affordance = None;
        }
    }

    /// Ends the drag over `target`. Returns the change to make, if any.
    pub fn drop(
        &mut self,
        target: &DropTarget,
        payload: &DragPayload,
        modifiers: DragModifiers,
        host: &dyn DropHost,
    ) -> Option<MutationRequest> {
        self.timer.cancel();
        self.affordance = None;
        if let Err(reason) = self.check(target, payload, host) {
            debug!("drop on {:?} ignored: {}", target, reason);
            return None;
        }
        let effect = self.effect(payload, modifiers);
        let mutation = match target {
            DropTarget::Tab(_) => None,
            DropTarget::SavedList => {
                let request = payload.request_object()?;
                let mut request = prepare_drop_request(&request);
                request.id = Uuid::new_v4().to_string();
                request.rev = None;
                request.kind = RequestKind::Saved;
                request.projects = vec![];
                Some(MutationRequest::SaveRequest { request })
            }
            DropTarget::ProjectRow { project_id } => {
                add_to_project(project_id, payload, effect, None)
            }
            DropTarget::RequestList { project_id, index } => {
                let request_id = payload.id()?;
                let same_project = !payload.is_history_origin()
                    && match payload.owner_project_id() {
                        Some(owner) => owner == project_id,
                        None => host.project_contains(project_id, &request_id),
                    };
                if same_project {
                    Some(MutationRequest::ReorderProjectRequests {
                        project_id: project_id.clone(),
                        request_id,
                        new_index: *index,
                    })
                } else {
                    add_to_project(project_id, payload, effect, Some(*index))
                }
            }
            DropTarget::ProjectOrder { index } => {
                Some(MutationRequest::ReorderProject {
                    project_id: payload.id()?,
                    new_index: *index,
                })
            }
        };
        if mutation.is_none() {
            debug!("drop on {:?} carries nothing to store", target);
        }
        mutation
    }

    /// Hands back the hovered target once its delay has passed.
    pub fn poll(&mut self) -> Option<DropTarget> {
        if !self.enabled {
            self.timer.cancel();
            return None;
        }
        self.timer.poll(self.clock.now())
    }
}

/// History entries are copied under a fresh id. Saved requests are moved out
/// of their owner project only when the effect says so.
fn add_to_project(
    project_id: &str,
    payload: &DragPayload,
    effect: DropEffect,
    index: Option<usize>,
) -> Option<MutationRequest> {
    let request_id = payload.id()?;
    if payload.is_history_origin() {
        return Some(MutationRequest::AddRequestToProject {
            project_id: project_id.to_string(),
            request_id: Uuid::new_v4().to_string(),
            origin: RequestOrigin::History {
                history_id: request_id,
            },
            index,
            effect: DropEffect::Copy,
        });
    }
    match (effect, payload.owner_project_id()) {
        (DropEffect::Move, Some(owner)) if owner != project_id => {
            Some(MutationRequest::MoveRequestBetweenProjects {
                from_project_id: owner.to_string(),
                to_project_id: project_id.to_string(),
                request_id,
                index,
            })
        }
        _ => Some(MutationRequest::AddRequestToProject {
            project_id: project_id.to_string(),
            request_id,
            origin: RequestOrigin::Saved,
            index,
            effect,
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use crate::data::project::Project;
    use crate::data::request::ArcRequest;
    use crate::dnd::clock::ManualClock;
    use crate::dnd::payload::MenuSource;

    use super::*;

    #[derive(Default)]
    struct TestHost {
        selected: Option<MenuPanel>,
        opened: BTreeSet<String>,
        members: BTreeSet<(String, String)>,
    }

    impl DropHost for TestHost {
        fn selected_panel(&self) -> Option<MenuPanel> {
            self.selected
        }

        fn is_project_open(&self, project_id: &str) -> bool {
            self.opened.contains(project_id)
        }

        fn project_contains(&self, project_id: &str, request_id: &str) -> bool {
            self.members
                .contains(&(project_id.to_string(), request_id.to_string()))
        }
    }

    fn arbitrator(capabilities: DropCapabilities) -> (DropArbitrator, ManualClock) {
        let clock = ManualClock::new();
        let arbitrator = DropArbitrator::new(capabilities)
            .with_clock(Rc::new(clock.clone()))
            .with_platform(Platform::Other);
        (arbitrator, clock)
    }

    fn request(id: &str, kind: RequestKind) -> ArcRequest {
        ArcRequest {
            id: id.to_string(),
            rev: Some("3-abc".to_string()),
            kind,
            url: "https://api.domain.com/users".to_string(),
            ..Default::default()
        }
    }

    fn saved_drag() -> DragPayload {
        DragPayload::for_request(&request("s1", RequestKind::Saved), MenuSource::SavedMenu)
    }

    fn history_drag() -> DragPayload {
        DragPayload::for_request(&request("h1", RequestKind::History), MenuSource::HistoryMenu)
    }

    fn row(id: &str) -> DropTarget {
        DropTarget::ProjectRow {
            project_id: id.to_string(),
        }
    }

    fn ctrl() -> DragModifiers {
        DragModifiers::command(Platform::Other)
    }

    #[test]
    fn repeated_drag_over_keeps_one_timer() {
        let (mut arbitrator, clock) = arbitrator(DropCapabilities::tab_container());
        let host = TestHost::default();
        let target = DropTarget::Tab(MenuPanel::Saved);
        let payload = saved_drag();

        let first = arbitrator.drag_over(&target, &payload, DragModifiers::default(), &host);
        assert!(first.accept && first.timer_armed);
        clock.advance_ms(400);
        for _ in 0..10 {
            arbitrator.drag_over(&target, &payload, DragModifiers::default(), &host);
        }
        clock.advance_ms(299);
        assert_eq!(arbitrator.poll(), None);
        clock.advance_ms(1);
        assert_eq!(arbitrator.poll(), Some(target));
        clock.advance_ms(5000);
        assert_eq!(arbitrator.poll(), None);
    }

    #[test]
    fn new_target_cancels_previous_timer() {
        let (mut arbitrator, clock) = arbitrator(DropCapabilities::projects_menu());
        let host = TestHost::default();
        let payload = saved_drag();

        arbitrator.drag_over(&row("a"), &payload, DragModifiers::default(), &host);
        clock.advance_ms(500);
        arbitrator.drag_over(&row("b"), &payload, DragModifiers::default(), &host);
        clock.advance_ms(300);
        assert_eq!(arbitrator.poll(), None);
        clock.advance_ms(400);
        assert_eq!(arbitrator.poll(), Some(row("b")));
        assert_eq!(arbitrator.poll(), None);
    }

    #[test]
    fn drag_leave_cancels_timer() {
        let (mut arbitrator, clock) = arbitrator(DropCapabilities::tab_container());
        let host = TestHost::default();
        let target = DropTarget::Tab(MenuPanel::Projects);

        arbitrator.drag_over(&target, &saved_drag(), DragModifiers::default(), &host);
        assert_eq!(arbitrator.affordance(), Some(&target));
        clock.advance_ms(100);
        arbitrator.drag_leave(&target);
        assert_eq!(arbitrator.affordance(), None);
        clock.advance_ms(10_000);
        assert_eq!(arbitrator.poll(), None);
    }

    #[test]
    fn leaving_another_target_keeps_timer() {
        let (mut arbitrator, clock) = arbitrator(DropCapabilities::projects_menu());
        let host = TestHost::default();
        arbitrator.drag_over(&row("b"), &saved_drag(), DragModifiers::default(), &host);
        arbitrator.drag_leave(&row("a"));
        clock.advance_ms(700);
        assert_eq!(arbitrator.poll(), Some(row("b")));
    }

    #[test]
    fn disabling_turns_timer_into_no_op() {
        let (mut arbitrator, clock) = arbitrator(DropCapabilities::tab_container());
        let host = TestHost::default();
        let target = DropTarget::Tab(MenuPanel::Saved);
        arbitrator.drag_over(&target, &saved_drag(), DragModifiers::default(), &host);
        arbitrator.set_enabled(false);
        clock.advance_ms(700);
        assert_eq!(arbitrator.poll(), None);
        let outcome = arbitrator.drag_over(&target, &saved_drag(), DragModifiers::default(), &host);
        assert!(!outcome.accept);
    }

    #[test]
    fn selected_tab_rejects_drag() {
        let (mut arbitrator, _) = arbitrator(DropCapabilities::tab_container());
        let host = TestHost {
            selected: Some(MenuPanel::Saved),
            ..Default::default()
        };
        let outcome = arbitrator.drag_over(
            &DropTarget::Tab(MenuPanel::Saved),
            &saved_drag(),
            DragModifiers::default(),
            &host,
        );
        assert_eq!(outcome, DragOverOutcome::rejected());
        assert_eq!(arbitrator.pending(), None);
    }

    #[test]
    fn history_and_api_tabs_are_not_destinations() {
        let (mut arbitrator, _) = arbitrator(DropCapabilities::tab_container());
        let host = TestHost::default();
        for panel in [MenuPanel::History, MenuPanel::ApiDocs] {
            let outcome = arbitrator.drag_over(
                &DropTarget::Tab(panel),
                &saved_drag(),
                DragModifiers::default(),
                &host,
            );
            assert!(!outcome.accept);
        }
    }

    #[test]
    fn tab_drop_makes_no_mutation() {
        let (mut arbitrator, _) = arbitrator(DropCapabilities::tab_container());
        let host = TestHost::default();
        let target = DropTarget::Tab(MenuPanel::Projects);
        assert_eq!(arbitrator.drop(&target, &saved_drag(), ctrl(), &host), None);
    }

    #[test]
    fn unknown_payload_is_rejected() {
        let (mut arbitrator, _) = arbitrator(DropCapabilities::projects_menu());
        let host = TestHost::default();
        let payload = DragPayload::new().with_data("text/plain", "hello");
        assert!(!arbitrator
            .drag_over(&row("a"), &payload, DragModifiers::default(), &host)
            .accept);
        assert_eq!(arbitrator.drop(&row("a"), &payload, ctrl(), &host), None);
    }

    #[test]
    fn dropping_on_owner_project_is_ignored() {
        let (mut arbitrator, _) = arbitrator(DropCapabilities::projects_menu());
        let host = TestHost::default();
        let payload = DragPayload::for_project_request(&request("s1", RequestKind::Saved), "p1");
        assert_eq!(arbitrator.drop(&row("p1"), &payload, ctrl(), &host), None);
        assert_eq!(
            arbitrator.drop(&row("p1"), &payload, DragModifiers::default(), &host),
            None
        );
    }

    #[test]
    fn dropping_member_from_saved_list_is_ignored() {
        let (mut arbitrator, _) = arbitrator(DropCapabilities::projects_menu());
        let host = TestHost {
            members: BTreeSet::from([("p1".to_string(), "s1".to_string())]),
            ..Default::default()
        };
        assert_eq!(
            arbitrator.drop(&row("p1"), &saved_drag(), DragModifiers::default(), &host),
            None
        );
    }

    #[test]
    fn history_drop_copies_with_fresh_id() {
        let (mut arbitrator, _) = arbitrator(DropCapabilities::projects_menu());
        let host = TestHost::default();
        let targets = [
            row("p1"),
            DropTarget::RequestList {
                project_id: "p1".to_string(),
                index: 2,
            },
        ];
        for target in targets {
            for modifiers in [DragModifiers::default(), ctrl()] {
                let mutation = arbitrator.drop(&target, &history_drag(), modifiers, &host);
                match mutation {
                    Some(MutationRequest::AddRequestToProject {
                        project_id,
                        request_id,
                        origin,
                        effect,
                        ..
                    }) => {
                        assert_eq!(project_id, "p1");
                        assert_ne!(request_id, "h1");
                        assert!(Uuid::parse_str(&request_id).is_ok());
                        assert_eq!(
                            origin,
                            RequestOrigin::History {
                                history_id: "h1".to_string()
                            }
                        );
                        assert_eq!(effect, DropEffect::Copy);
                    }
                    other => panic!("unexpected mutation {:?}", other),
                }
            }
        }
    }

    #[test]
    fn ctrl_drop_moves_between_projects() {
        let (mut arbitrator, _) = arbitrator(DropCapabilities::projects_menu());
        let host = TestHost::default();
        let payload = DragPayload::for_project_request(&request("s1", RequestKind::Saved), "p1");
        let moved = arbitrator.drop(&row("p2"), &payload, ctrl(), &host);
        assert_eq!(
            moved,
            Some(MutationRequest::MoveRequestBetweenProjects {
                from_project_id: "p1".to_string(),
                to_project_id: "p2".to_string(),
                request_id: "s1".to_string(),
                index: None,
            })
        );
        let copied = arbitrator.drop(&row("p2"), &payload, DragModifiers::default(), &host);
        assert!(matches!(
            copied,
            Some(MutationRequest::AddRequestToProject {
                effect: DropEffect::Copy,
                origin: RequestOrigin::Saved,
                ..
            })
        ));
    }

    #[test]
    fn apple_uses_meta_for_move() {
        let (arbitrator, _) = arbitrator(DropCapabilities::projects_menu());
        let mut arbitrator = arbitrator.with_platform(Platform::Apple);
        let host = TestHost::default();
        let payload = saved_drag();
        let outcome = arbitrator.drag_over(&row("p2"), &payload, ctrl(), &host);
        assert_eq!(outcome.effect, Some(DropEffect::Copy));
        let outcome = arbitrator.drag_over(
            &row("p2"),
            &payload,
            DragModifiers::command(Platform::Apple),
            &host,
        );
        assert_eq!(outcome.effect, Some(DropEffect::Move));
    }

    #[test]
    fn drop_inside_owner_list_reorders() {
        let (mut arbitrator, _) = arbitrator(DropCapabilities::projects_menu());
        let host = TestHost::default();
        let payload = DragPayload::for_project_request(&request("s1", RequestKind::Saved), "p1");
        let target = DropTarget::RequestList {
            project_id: "p1".to_string(),
            index: 0,
        };
        assert_eq!(
            arbitrator.drop(&target, &payload, ctrl(), &host),
            Some(MutationRequest::ReorderProjectRequests {
                project_id: "p1".to_string(),
                request_id: "s1".to_string(),
                new_index: 0,
            })
        );
    }

    #[test]
    fn saved_list_takes_history_copies_only() {
        let (mut arbitrator, _) = arbitrator(DropCapabilities::saved_menu());
        let host = TestHost::default();
        assert_eq!(
            arbitrator.drop(&DropTarget::SavedList, &saved_drag(), DragModifiers::default(), &host),
            None
        );
        match arbitrator.drop(&DropTarget::SavedList, &history_drag(), DragModifiers::default(), &host) {
            Some(MutationRequest::SaveRequest { request }) => {
                assert_ne!(request.id, "h1");
                assert_eq!(request.rev, None);
                assert_eq!(request.kind, RequestKind::Saved);
                assert_eq!(request.url, "https://api.domain.com/users");
            }
            other => panic!("unexpected mutation {:?}", other),
        }
    }

    #[test]
    fn malformed_request_object_is_silently_ignored() {
        let (mut arbitrator, _) = arbitrator(DropCapabilities::saved_menu());
        let host = TestHost::default();
        let mut payload = history_drag();
        payload.set_data(TYPE_REQUEST_OBJECT, "{not json");
        assert_eq!(
            arbitrator.drop(&DropTarget::SavedList, &payload, DragModifiers::default(), &host),
            None
        );
    }

    #[test]
    fn projects_only_drop_on_project_order() {
        let (mut arbitrator, _) = arbitrator(DropCapabilities::projects_menu());
        let host = TestHost::default();
        let project = Project {
            id: "p3".to_string(),
            ..Default::default()
        };
        let payload = DragPayload::for_project(&project, MenuSource::ProjectsMenu);
        assert_eq!(arbitrator.drop(&row("p1"), &payload, ctrl(), &host), None);
        assert_eq!(
            arbitrator.drop(&DropTarget::ProjectOrder { index: 0 }, &payload, ctrl(), &host),
            Some(MutationRequest::ReorderProject {
                project_id: "p3".to_string(),
                new_index: 0,
            })
        );
    }

    #[test]
    fn opened_project_row_does_not_arm() {
        let (mut arbitrator, _) = arbitrator(DropCapabilities::projects_menu());
        let host = TestHost {
            opened: BTreeSet::from(["p1".to_string()]),
            ..Default::default()
        };
        let outcome = arbitrator.drag_over(&row("p1"), &saved_drag(), DragModifiers::default(), &host);
        assert!(outcome.accept);
        assert!(!outcome.timer_armed);
    }
}
