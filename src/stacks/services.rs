use tracing::{debug, info, warn};

use crate::{
    error::{ServiceError, ServiceResult},
    stacks::{
        dto::{ItemRequest, ItemResponse, StackResponse},
        repo_types::{Item, Stack},
    },
    state::AppState,
};

/// Creates an empty stack for an existing user.
pub async fn create(st: &AppState, owner_id: &str) -> ServiceResult<StackResponse> {
    let owner = st.users.find_by_id(owner_id).await?;
    let stack = Stack {
        id: st.ids.generate(),
        owner: owner.id,
        items: Vec::new(),
    };
    st.stacks.insert(&stack).await?;
    info!(stack_id = %stack.id, owner = %stack.owner, "stack created");
    Ok(stack.into())
}

pub async fn find_by_id_from_owner(
    st: &AppState,
    id: &str,
    owner_id: &str,
) -> ServiceResult<StackResponse> {
    Ok(find_owned(st, id, owner_id).await?.into())
}

pub async fn find_all_from_owner(st: &AppState, owner_id: &str) -> ServiceResult<Vec<StackResponse>> {
    let stacks = st.stacks.find_by_owner(owner_id).await?;
    Ok(stacks.into_iter().map(StackResponse::from).collect())
}

/// Pushes onto `id` only if it is one of `owner_id`'s stacks.
pub async fn push_from_owner(
    st: &AppState,
    id: &str,
    owner_id: &str,
    req: ItemRequest,
) -> ServiceResult<ItemResponse> {
    if !req.is_valid() {
        return Err(ServiceError::BadRequest);
    }
    let _guard = st.stack_locks.acquire(id).await;

    let mut stack = find_owned(st, id, owner_id).await?;
    let item = push_item(&mut stack, req.name);
    st.stacks.update(&stack).await?;

    debug!(stack_id = %id, index = item.index, "item pushed");
    Ok(item.into())
}

/// Pops from `id` only if it is one of `owner_id`'s stacks.
pub async fn pop_from_owner(st: &AppState, id: &str, owner_id: &str) -> ServiceResult<ItemResponse> {
    let _guard = st.stack_locks.acquire(id).await;

    let mut stack = find_owned(st, id, owner_id).await?;
    let item = pop_item(&mut stack)?;
    st.stacks.update(&stack).await?;

    debug!(stack_id = %id, index = item.index, "item popped");
    Ok(item.into())
}

// --- unscoped: no ownership check, not routed ---

/// Unprotected: any caller can read any stack.
pub async fn find_by_id(st: &AppState, id: &str) -> ServiceResult<StackResponse> {
    Ok(st.stacks.find_by_id(id).await?.into())
}

/// Unprotected: lists every stack of every owner.
pub async fn find_all(st: &AppState) -> ServiceResult<Vec<StackResponse>> {
    let stacks = st.stacks.find_all().await?;
    Ok(stacks.into_iter().map(StackResponse::from).collect())
}

/// Unprotected: pushes onto any stack by id.
pub async fn push(st: &AppState, id: &str, req: ItemRequest) -> ServiceResult<ItemResponse> {
    if !req.is_valid() {
        return Err(ServiceError::BadRequest);
    }
    let _guard = st.stack_locks.acquire(id).await;

    let mut stack = st.stacks.find_by_id(id).await?;
    let item = push_item(&mut stack, req.name);
    st.stacks.update(&stack).await?;
    Ok(item.into())
}

/// Unprotected: pops from any stack by id.
pub async fn pop(st: &AppState, id: &str) -> ServiceResult<ItemResponse> {
    let _guard = st.stack_locks.acquire(id).await;

    let mut stack = st.stacks.find_by_id(id).await?;
    let item = pop_item(&mut stack)?;
    st.stacks.update(&stack).await?;
    Ok(item.into())
}

/// Looks `id` up inside the owner's set; a stack of someone else is
/// indistinguishable from a missing one.
async fn find_owned(st: &AppState, id: &str, owner_id: &str) -> ServiceResult<Stack> {
    let stacks = st.stacks.find_by_owner(owner_id).await?;
    stacks.into_iter().find(|s| s.id == id).ok_or_else(|| {
        warn!(stack_id = %id, owner = %owner_id, "stack not in owner's set");
        ServiceError::NotFound
    })
}

fn push_item(stack: &mut Stack, name: String) -> Item {
    let item = Item {
        index: stack.items.len() as u64,
        name,
    };
    stack.items.push(item.clone());
    item
}

fn pop_item(stack: &mut Stack) -> ServiceResult<Item> {
    stack.items.pop().ok_or(ServiceError::NotFound)
}
